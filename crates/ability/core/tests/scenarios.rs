//! End-to-end scenarios for the attribute resolution pipeline.

use std::sync::Arc;

use ability_core::{
    AbilitySystem, AttributeBasedMagnitude, AttributeCapture, AttributeKey, BackedAttributeCalc,
    CaptureSource, EffectContext, EffectKind, EffectSpec, EvalWarning, FixedLevel, MagnitudeSource,
    Modifier,
};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Asserts `0 <= current <= max` and `0 <= base <= max` for every vital pair.
fn assert_vital_invariants(system: &AbilitySystem) {
    let pairs = [
        (AttributeKey::Health, AttributeKey::MaxHealth),
        (AttributeKey::Mana, AttributeKey::MaxMana),
        (AttributeKey::Stamina, AttributeKey::MaxStamina),
    ];
    for (current, max) in pairs {
        let value = system.attributes().get(current);
        let ceiling = system.attributes().current(max);
        assert!(
            (0.0..=ceiling).contains(&value.current),
            "{current} current {} outside [0, {ceiling}]",
            value.current
        );
        assert!(
            (0.0..=ceiling).contains(&value.base),
            "{current} base {} outside [0, {ceiling}]",
            value.base
        );
    }
}

/// System with Health 10/1000 plus the primary attributes the stat-backed
/// scenarios read: Vigor 9, Strength 10, Endurance 12.
fn scenario_system() -> AbilitySystem {
    init_tracing();
    let mut system = AbilitySystem::new();
    system.initialize_attributes([
        (AttributeKey::MaxHealth, 1000.0),
        (AttributeKey::Health, 10.0),
        (AttributeKey::Vigor, 9.0),
        (AttributeKey::Strength, 10.0),
        (AttributeKey::Endurance, 12.0),
    ]);
    system
}

fn backed(attribute: AttributeKey) -> MagnitudeSource {
    MagnitudeSource::AttributeBased(AttributeBasedMagnitude::new(AttributeCapture::target(
        attribute,
    )))
}

#[test]
fn scenario_a_all_additive_stats() {
    let mut system = scenario_system();
    let spec = EffectSpec::new("war cry", EffectKind::Instant)
        .with_modifier(Modifier::add(AttributeKey::Health, backed(AttributeKey::Vigor)))
        .with_modifier(Modifier::add(
            AttributeKey::Health,
            backed(AttributeKey::Strength),
        ))
        .with_modifier(Modifier::add(
            AttributeKey::Health,
            backed(AttributeKey::Endurance),
        ));
    system.apply_effect(spec).unwrap();
    // 10 + 9 + 10 + 12
    assert_eq!(system.attributes().current(AttributeKey::Health), 41.0);
    assert_vital_invariants(&system);
}

#[test]
fn scenario_b_add_multiply_add() {
    let mut system = scenario_system();
    let spec = EffectSpec::new("surge", EffectKind::Instant)
        .with_modifier(Modifier::add(AttributeKey::Health, backed(AttributeKey::Vigor)))
        .with_modifier(Modifier::multiply(
            AttributeKey::Health,
            backed(AttributeKey::Strength),
        ))
        .with_modifier(Modifier::add(
            AttributeKey::Health,
            backed(AttributeKey::Endurance),
        ));
    system.apply_effect(spec).unwrap();
    // (10 + 9) * 10 + 12
    assert_eq!(system.attributes().current(AttributeKey::Health), 202.0);
    assert_vital_invariants(&system);
}

#[test]
fn scenario_c_add_multiply_divide() {
    let mut system = scenario_system();
    let spec = EffectSpec::new("tempered surge", EffectKind::Instant)
        .with_modifier(Modifier::add(AttributeKey::Health, backed(AttributeKey::Vigor)))
        .with_modifier(Modifier::multiply(
            AttributeKey::Health,
            backed(AttributeKey::Strength),
        ))
        .with_modifier(Modifier::divide(
            AttributeKey::Health,
            backed(AttributeKey::Endurance),
        ));
    system.apply_effect(spec).unwrap();
    // (10 + 9) * 10 / 12 ≈ 15.83
    let health = system.attributes().current(AttributeKey::Health);
    assert!((health - 190.0 / 12.0).abs() < 1e-3, "got {health}");
    assert_vital_invariants(&system);
}

#[test]
fn scenario_d_max_decrease_clamps_dependent() {
    init_tracing();
    let mut system = AbilitySystem::new();
    system.initialize_attributes([
        (AttributeKey::MaxHealth, 200.0),
        (AttributeKey::Health, 150.0),
    ]);

    let spec = EffectSpec::new("curse of frailty", EffectKind::Instant).with_modifier(
        Modifier::override_to(AttributeKey::MaxHealth, MagnitudeSource::Constant(100.0)),
    );
    system.apply_effect(spec).unwrap();

    assert_eq!(system.attributes().current(AttributeKey::MaxHealth), 100.0);
    // Post-effect-execute pulled Health down to the new max, exactly.
    assert_eq!(system.attributes().current(AttributeKey::Health), 100.0);
    assert_vital_invariants(&system);
}

#[test]
fn scenario_e_invisible_buffer_regression() {
    init_tracing();
    let mut system = AbilitySystem::new();
    system.initialize_attributes([
        (AttributeKey::MaxHealth, 100.0),
        (AttributeKey::Health, 50.0),
    ]);

    // Infinite drain: -5 health per second, permanently (periodic base damage).
    let drain = system
        .apply_effect(
            EffectSpec::new(
                "withering",
                EffectKind::Periodic {
                    period: 1.0,
                    duration: None,
                },
            )
            .with_modifier(Modifier::add(
                AttributeKey::Health,
                MagnitudeSource::Constant(-5.0),
            )),
        )
        .unwrap()
        .unwrap();

    // Two +50 temporary buffs, 10 seconds each.
    for name in ["rally", "second wind"] {
        system
            .apply_effect(
                EffectSpec::new(name, EffectKind::HasDuration(10.0)).with_modifier(Modifier::add(
                    AttributeKey::Health,
                    MagnitudeSource::Constant(50.0),
                )),
            )
            .unwrap();
    }

    // Visible current must never exceed max at any evaluation point.
    for _ in 0..8 {
        system.tick(0.5);
        assert!(system.attributes().current(AttributeKey::Health) <= 100.0);
        assert_vital_invariants(&system);
    }

    system.remove_effect(drain).unwrap();
    assert!(system.attributes().current(AttributeKey::Health) <= 100.0);
    assert_vital_invariants(&system);

    // Buffs run out; the visible value settles back onto the drained base.
    system.tick(10.0);
    let settled = system.attributes().get(AttributeKey::Health);
    assert_eq!(settled.current, settled.base);
    assert_vital_invariants(&system);
}

#[test]
fn snapshot_magnitude_ignores_later_backing_changes() {
    let mut system = scenario_system();

    let snapshot = MagnitudeSource::AttributeBased(AttributeBasedMagnitude::new(
        AttributeCapture::target(AttributeKey::Endurance).snapshotted(),
    ));
    system
        .apply_effect(
            EffectSpec::new("old oath", EffectKind::Infinite)
                .with_modifier(Modifier::add(AttributeKey::Armor, snapshot)),
        )
        .unwrap();
    assert_eq!(system.attributes().current(AttributeKey::Armor), 12.0);

    // Raise Endurance permanently; the snapshotted armor bonus must not move.
    system
        .apply_effect(
            EffectSpec::new("training", EffectKind::Instant).with_modifier(Modifier::add(
                AttributeKey::Endurance,
                MagnitudeSource::Constant(8.0),
            )),
        )
        .unwrap();
    assert_eq!(system.attributes().current(AttributeKey::Endurance), 20.0);
    assert_eq!(system.attributes().current(AttributeKey::Armor), 12.0);
}

#[test]
fn live_magnitude_tracks_backing_changes() {
    let mut system = scenario_system();

    // Armor = 1.25 * (Endurance + 5), captured live.
    let live = MagnitudeSource::AttributeBased(
        AttributeBasedMagnitude::new(AttributeCapture::target(AttributeKey::Endurance))
            .with_pre_add(5.0)
            .with_coefficient(1.25),
    );
    system
        .apply_effect(
            EffectSpec::new("plate training", EffectKind::Infinite)
                .with_modifier(Modifier::override_to(AttributeKey::Armor, live)),
        )
        .unwrap();
    assert_eq!(system.attributes().current(AttributeKey::Armor), 21.25);

    system
        .apply_effect(
            EffectSpec::new("training", EffectKind::Instant).with_modifier(Modifier::add(
                AttributeKey::Endurance,
                MagnitudeSource::Constant(8.0),
            )),
        )
        .unwrap();
    // 1.25 * (20 + 5)
    assert_eq!(system.attributes().current(AttributeKey::Armor), 31.25);
}

#[test]
fn custom_calculation_drives_max_stamina() {
    init_tracing();
    let mut system = AbilitySystem::new();
    system.initialize_attributes([
        (AttributeKey::Endurance, 12.0),
        (AttributeKey::MaxStamina, 80.0),
        (AttributeKey::Stamina, 80.0),
    ]);

    let spec = EffectSpec::new("conditioning", EffectKind::Infinite)
        .with_modifier(Modifier::override_to(
            AttributeKey::MaxStamina,
            MagnitudeSource::custom(Arc::new(BackedAttributeCalc::max_stamina())),
        ))
        .with_context(EffectContext::new().with_source_object(Arc::new(FixedLevel(3))));
    system.apply_effect(spec).unwrap();

    // 80 + 2.5 * 12 + 10 * 3
    assert_eq!(system.attributes().current(AttributeKey::MaxStamina), 140.0);

    // Endurance is captured live: a permanent change propagates.
    system
        .apply_effect(
            EffectSpec::new("training", EffectKind::Instant).with_modifier(Modifier::add(
                AttributeKey::Endurance,
                MagnitudeSource::Constant(4.0),
            )),
        )
        .unwrap();
    // 80 + 2.5 * 16 + 30
    assert_eq!(system.attributes().current(AttributeKey::MaxStamina), 150.0);
    assert!(system.warnings().is_empty());
}

#[test]
fn source_side_captures_snapshot_the_applier() {
    init_tracing();
    let mut caster = AbilitySystem::new();
    caster.initialize_attributes([(AttributeKey::Intelligence, 30.0)]);

    let mut target = AbilitySystem::new();
    target.initialize_attributes([
        (AttributeKey::MaxMana, 200.0),
        (AttributeKey::Mana, 100.0),
    ]);

    // Drain scales off the *caster's* Intelligence at application time.
    let drain = MagnitudeSource::AttributeBased(
        AttributeBasedMagnitude::new(AttributeCapture::source(AttributeKey::Intelligence))
            .with_coefficient(-1.0),
    );
    target
        .apply_effect_from(
            Some(&caster),
            EffectSpec::new("mana leech", EffectKind::Infinite)
                .with_modifier(Modifier::add(AttributeKey::Mana, drain)),
        )
        .unwrap();
    assert_eq!(target.attributes().current(AttributeKey::Mana), 70.0);

    // The caster's later stat changes do not retroactively alter the leech.
    caster
        .apply_effect(
            EffectSpec::new("study", EffectKind::Instant).with_modifier(Modifier::add(
                AttributeKey::Intelligence,
                MagnitudeSource::Constant(100.0),
            )),
        )
        .unwrap();
    target.tick(1.0);
    assert_eq!(target.attributes().current(AttributeKey::Mana), 70.0);
}

#[test]
fn divide_by_zero_in_effect_is_recovered_and_logged() {
    let mut system = scenario_system();
    let spec = EffectSpec::new("bad math", EffectKind::Instant)
        .with_modifier(Modifier::add(
            AttributeKey::Health,
            MagnitudeSource::Constant(5.0),
        ))
        .with_modifier(Modifier::divide(
            AttributeKey::Health,
            MagnitudeSource::Constant(0.0),
        ));
    system.apply_effect(spec).unwrap();

    let health = system.attributes().current(AttributeKey::Health);
    assert!(health.is_finite());
    assert_eq!(health, 15.0);
    assert!(
        system
            .warnings()
            .any(|w| matches!(w, EvalWarning::DivideByZero { .. }))
    );
}

#[test]
fn missing_source_capture_fails_closed_and_logs() {
    let mut system = scenario_system();
    let spec = EffectSpec::new("orphan leech", EffectKind::Instant).with_modifier(Modifier::add(
        AttributeKey::Health,
        MagnitudeSource::AttributeBased(AttributeBasedMagnitude::new(AttributeCapture::source(
            AttributeKey::Intelligence,
        ))),
    ));
    // No source system supplied: the capture resolves to zero.
    system.apply_effect(spec).unwrap();
    assert_eq!(system.attributes().current(AttributeKey::Health), 10.0);
    assert!(system.warnings().any(|w| matches!(
        w,
        EvalWarning::MissingCapture {
            side: CaptureSource::Source,
            ..
        }
    )));
}
