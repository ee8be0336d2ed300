use super::*;
use alloc::vec;

fn busy_rotation() -> Rotation {
    let group = Group::new(
        "execute",
        vec![
            cast_after(7, APLValue::placeholder("threshold")),
            cast_after(8, APLValue::variable_ref("t")),
        ],
    )
    .with_variable("t", APLValue::constant("10"));

    Rotation::apl(vec![
        cast(HEAL).with_condition(health_above("50")),
        APLAction::group_ref("execute")
            .with_condition(APLValue::aura_is_active(99))
            .with_override("threshold", APLValue::variable_ref("hp")),
        APLAction::wait(APLValue::variable_ref("pause")),
    ])
    .with_group(group)
    .with_variable("hp", APLValue::constant("35%"))
    .with_variable("pause", APLValue::constant("250ms"))
    .with_prepull(PrepullAction::new(cast(1), "-1s"))
    .with_prepull(PrepullAction::new(
        APLAction::group_ref("execute").with_override("threshold", APLValue::constant("0s")),
        "-2s",
    ))
}

fn prepull_actions(assembly: &Assembly) -> Vec<APLAction> {
    assembly
        .resolved
        .prepull_actions
        .iter()
        .map(|p| p.action.clone())
        .collect()
}

#[test]
fn test_end_to_end_single_guarded_action() {
    let guard = health_above("50");
    let rotation = Rotation::apl(vec![cast(HEAL).with_condition(guard.clone())]);

    let assembly = assemble(&rotation);

    assert!(assembly.diagnostics.is_empty());
    assert_eq!(assembly.resolved.priority_list.len(), 1);
    assert_eq!(assembly.resolved.priority_list[0].condition, Some(guard));
    assert_eq!(spell_ids(&assembly.resolved.priority_list), vec![HEAL]);
    assert!(assembly.resolved.prepull_actions.is_empty());
}

#[test]
fn test_busy_rotation_is_closed() {
    let assembly = assemble(&busy_rotation());

    assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    assert_closed(&assembly.resolved);
    assert_eq!(spell_ids(&assembly.resolved.priority_list), vec![HEAL, 7, 8, 0]);
    assert_eq!(
        assembly.resolved.priority_list[1].condition,
        Some(APLValue::and(vec![
            APLValue::aura_is_active(99),
            time_above(APLValue::constant("35%")),
        ]))
    );
    assert_eq!(
        assembly.resolved.priority_list[2].condition,
        Some(APLValue::and(vec![
            APLValue::aura_is_active(99),
            time_above(APLValue::constant("10")),
        ]))
    );
    assert_eq!(spell_ids(&prepull_actions(&assembly)), vec![7, 8, 1]);
}

#[test]
fn test_hidden_and_empty_priority_items_are_excluded() {
    let mut rotation = Rotation::apl(vec![cast(1), cast(2)]);
    rotation.priority_list[0].hide = true;
    rotation.priority_list.push(ListItem::default());
    rotation.priority_list.push(ListItem::new(APLAction::default()));
    rotation.priority_list.push(ListItem::new(cast(3)));

    let assembly = assemble(&rotation);

    assert!(assembly.diagnostics.is_empty());
    assert_eq!(spell_ids(&assembly.resolved.priority_list), vec![2, 3]);
    // The authored rotation keeps the hidden item
    assert_eq!(rotation.priority_list.len(), 5);
}

#[test]
fn test_prepull_sorted_by_time_with_stable_ties() {
    let rotation = Rotation::apl(vec![])
        .with_prepull(PrepullAction::new(cast(1), "-1s"))
        .with_prepull(PrepullAction::new(cast(2), "-3s"))
        .with_prepull(PrepullAction::new(cast(3), "-1000ms"))
        .with_prepull(PrepullAction::new(cast(4), "0s"))
        .with_prepull(PrepullAction::new(cast(5), "-1.5s"));

    let assembly = assemble(&rotation);

    assert_eq!(spell_ids(&prepull_actions(&assembly)), vec![2, 5, 1, 3, 4]);
    assert_eq!(assembly.resolved.prepull_actions[0].do_at_nanos, -3_000_000_000);
}

#[test]
fn test_invalid_prepull_times_are_dropped_with_warning() {
    let mut hidden = PrepullAction::new(cast(4), "5s");
    hidden.hide = true;
    let rotation = Rotation::apl(vec![])
        .with_prepull(PrepullAction::new(cast(1), "2s"))
        .with_prepull(PrepullAction::new(cast(2), "soon"))
        .with_prepull(PrepullAction::new(cast(3), "-2s"))
        .with_prepull(hidden);

    let assembly = assemble(&rotation);

    assert_eq!(
        kinds(&assembly),
        vec![
            DiagnosticKind::InvalidPrepullTime { value: "2s".into() },
            DiagnosticKind::InvalidPrepullTime {
                value: "soon".into()
            },
        ]
    );
    assert!(!assembly.has_hard_errors());
    assert_eq!(assembly.resolved.prepull_actions.len(), 1);
    assert_eq!(assembly.diagnostics[1].site, Site::Prepull { index: 1 });
}

#[test]
fn test_prepull_time_from_variable() {
    let mut prepull = PrepullAction::new(cast(1), "");
    prepull.do_at_value = Some(APLValue::variable_ref("pot"));
    let rotation = Rotation::apl(vec![])
        .with_variable("pot", APLValue::constant("-1.5s"))
        .with_prepull(prepull);

    let assembly = assemble(&rotation);

    assert!(assembly.diagnostics.is_empty());
    assert_eq!(assembly.resolved.prepull_actions[0].do_at_nanos, -1_500_000_000);
}

#[test]
fn test_prepull_group_reference_is_spliced_at_the_same_time() {
    let rotation = Rotation::apl(vec![])
        .with_group(Group::new("potions", vec![cast(20), cast(21)]))
        .with_prepull(PrepullAction::new(cast(1), "-1s"))
        .with_prepull(PrepullAction::new(APLAction::group_ref("potions"), "-2s"));

    let assembly = assemble(&rotation);

    let times: Vec<i64> = assembly
        .resolved
        .prepull_actions
        .iter()
        .map(|p| p.do_at_nanos)
        .collect();
    assert_eq!(times, vec![-2_000_000_000, -2_000_000_000, -1_000_000_000]);
}

#[test]
fn test_assembly_is_idempotent() {
    let first = assemble(&busy_rotation()).resolved;
    let again = assemble(&first.to_rotation());

    assert!(again.diagnostics.is_empty());
    assert_eq!(again.resolved, first);
    assert_eq!(
        serde_json::to_string(&again.resolved).unwrap(),
        serde_json::to_string(&first).unwrap()
    );
}

#[test]
fn test_assembly_is_deterministic() {
    let rotation = busy_rotation();
    let a = assemble(&rotation);
    let b = assemble(&rotation.clone());

    assert_eq!(a, b);
    assert_eq!(
        parity_scale_codec::Encode::encode(&a.resolved),
        parity_scale_codec::Encode::encode(&b.resolved)
    );
}

#[test]
fn test_id_seed_changes_minted_uuids_only() {
    let rotation = busy_rotation();
    let config = ResolveConfig {
        id_seed: 42,
        ..Default::default()
    };
    let a = assemble(&rotation);
    let b = assemble_with(&rotation, &config);

    assert_eq!(a.resolved, b.resolved);
    assert_ne!(
        serde_json::to_string(&a.resolved).unwrap(),
        serde_json::to_string(&b.resolved).unwrap()
    );
}

#[test]
fn test_invalid_unit_reference_is_a_warning() {
    let mut action = cast(HEAL);
    if let Some(ActionKind::CastSpell(c)) = &mut action.action {
        c.target = Some(UnitReference::of(UnitType::Pet));
    }
    let rotation = Rotation::apl(vec![action]);

    let assembly = assemble(&rotation);

    assert_eq!(
        kinds(&assembly),
        vec![DiagnosticKind::InvalidUnitReference {
            reason: "pet reference needs an owner".into()
        }]
    );
    assert!(!assembly.has_hard_errors());
    assert_eq!(assembly.resolved.priority_list.len(), 1);
}

#[test]
fn test_unit_reference_validation() {
    let owned_pet = UnitReference {
        unit_type: UnitType::Pet,
        index: 0,
        owner: Some(alloc::boxed::Box::new(UnitReference::of(UnitType::Player))),
    };
    assert_eq!(owned_pet.validate(), None);
    assert_eq!(UnitReference::default().validate(), None);
    assert!(UnitReference {
        index: -1,
        ..UnitReference::of(UnitType::Target)
    }
    .validate()
    .is_some());
    assert!(UnitReference {
        owner: Some(alloc::boxed::Box::new(UnitReference::of(UnitType::Player))),
        ..UnitReference::of(UnitType::Target)
    }
    .validate()
    .is_some());
    let unowned_pet = UnitReference {
        owner: Some(alloc::boxed::Box::new(UnitReference::default())),
        ..UnitReference::of(UnitType::Pet)
    };
    assert_eq!(unowned_pet.validate(), Some("pet owner needs a type"));
}

#[test]
fn test_diagnostics_split_by_severity() {
    let rotation = Rotation::apl(vec![APLAction::group_ref("nope")])
        .with_variable("x", APLValue::constant("1"))
        .with_variable("x", APLValue::constant("2"));

    let assembly = assemble(&rotation);

    assert_eq!(assembly.errors().count(), 1);
    assert_eq!(assembly.warnings().count(), 1);
    assert_eq!(assembly.diagnostics[0].severity(), Severity::Warning);
}
