use super::*;
use alloc::vec;

const SAVED_PRESET: &str = r#"{
    "type": "TypeAPL",
    "prepullActions": [
        {"action": {"castSpell": {"spellId": {"spellId": 1234}}},
         "doAtValue": {"const": {"val": "-1s"}}}
    ],
    "priorityList": [
        {"action": {
            "condition": {"uuid": {"value": "c1"}, "cmp": {
                "op": "OpGt",
                "lhs": {"currentHealthPercent": {}},
                "rhs": {"const": {"val": "50%"}}
            }},
            "castSpell": {"spellId": {"spellId": 2061}}
        }},
        {"hide": true, "action": {"groupReference": {"groupName": "aoe"}}},
        {"action": {"castSpell": {"spellId": {"spellId": 1, "tag": 2}, "target": {"type": "Self"}}}}
    ],
    "groups": [
        {"name": "aoe", "actions": [{"action": {"castSpell": {"spellId": {"itemId": 5512}}}}]}
    ],
    "valueVariables": [
        {"name": "x", "value": {"uuid": {"value": "abc"}, "const": {"val": "5"}}}
    ]
}"#;

#[test]
fn test_parses_saved_preset() {
    let rotation = Rotation::from_json(SAVED_PRESET).unwrap();

    assert_eq!(rotation.rotation_type, RotationType::Apl);
    assert_eq!(rotation.prepull_actions.len(), 1);
    assert_eq!(rotation.priority_list.len(), 3);
    assert!(rotation.priority_list[1].hide);

    let first = rotation.priority_list[0].action.as_ref().unwrap();
    assert_eq!(first.condition.as_ref().unwrap().uuid, Some(Uuid::new("c1")));
    assert_eq!(first.condition, Some(health_above("50%")));
    assert_eq!(spell_ids(&[first.clone()]), vec![HEAL]);

    match &rotation.priority_list[2].action.as_ref().unwrap().action {
        Some(ActionKind::CastSpell(c)) => {
            assert_eq!(c.spell_id.as_ref().map(|id| id.tag), Some(2));
            assert_eq!(c.target.as_ref().map(|t| t.unit_type), Some(UnitType::SelfUnit));
        }
        other => panic!("expected castSpell, got {:?}", other),
    }
    match &rotation.groups[0].actions[0].action.as_ref().unwrap().action {
        Some(ActionKind::CastSpell(c)) => {
            assert_eq!(c.spell_id, Some(ActionId::item(5512)))
        }
        other => panic!("expected castSpell, got {:?}", other),
    }
    assert_eq!(rotation.value_variables[0].value, Some(APLValue::constant("5")));
}

#[test]
fn test_value_serializes_in_proto_json_shape() {
    let value = APLValue::constant("-2s").with_uuid("u1");

    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        r#"{"uuid":{"value":"u1"},"const":{"val":"-2s"}}"#
    );
    assert_eq!(
        serde_json::to_string(&cast(123)).unwrap(),
        r#"{"castSpell":{"spellId":{"spellId":123}}}"#
    );
    assert_eq!(
        serde_json::to_string(&APLValue::current_time()).unwrap(),
        r#"{"currentTime":{}}"#
    );
}

#[test]
fn test_default_fields_are_omitted() {
    let json = serde_json::to_string(&Rotation::apl(vec![cast(1)])).unwrap();

    assert_eq!(
        json,
        r#"{"type":"TypeAPL","priorityList":[{"action":{"castSpell":{"spellId":{"spellId":1}}}}]}"#
    );
}

#[test]
fn test_json_round_trip_preserves_preset() {
    let rotation = Rotation::from_json(SAVED_PRESET).unwrap();
    let reparsed = Rotation::from_json(&rotation.to_json().unwrap()).unwrap();

    assert_eq!(reparsed, rotation);
    let condition = reparsed.priority_list[0]
        .action
        .as_ref()
        .and_then(|a| a.condition.as_ref())
        .unwrap();
    assert_eq!(condition.uuid, Some(Uuid::new("c1")));
}

#[test]
fn test_unknown_fields_and_kinds_are_tolerated() {
    let json = r#"{
        "type": "TypeAPL",
        "futureField": 1,
        "priorityList": [
            {"action": {"someFutureAction": {}}},
            {"action": {"castSpell": {"spellId": {"spellId": 7}}}}
        ]
    }"#;

    let rotation = Rotation::from_json(json).unwrap();
    let assembly = assemble(&rotation);

    assert!(rotation.priority_list[0].action.as_ref().unwrap().action.is_none());
    assert_eq!(spell_ids(&assembly.resolved.priority_list), vec![7]);
}

#[test]
fn test_invalid_json_is_an_error() {
    let err = Rotation::from_json("{\"type\": 5}").unwrap_err();

    assert!(matches!(err, AplError::InvalidJson { .. }));
}

#[test]
fn test_resolved_rotation_scale_hand_off() {
    let rotation = Rotation::from_json(SAVED_PRESET).unwrap();
    let resolved = assemble(&rotation).resolved;

    let bytes = parity_scale_codec::Encode::encode(&resolved);
    let decoded: ResolvedRotation = parity_scale_codec::Decode::decode(&mut &bytes[..]).unwrap();

    assert_eq!(decoded, resolved);
    assert!(Rotation::from_scale(&[0xff]).is_err());
}

#[test]
fn test_diagnostic_serializes_tagged() {
    let diagnostic = Diagnostic {
        kind: DiagnosticKind::UnresolvedVariable { name: "x".into() },
        site: Site::PriorityList { index: 3 },
        uuid: None,
    };

    assert_eq!(
        serde_json::to_string(&diagnostic).unwrap(),
        concat!(
            r#"{"kind":{"type":"unresolvedVariable","name":"x"},"#,
            r#""site":{"type":"priorityList","index":3}}"#
        )
    );
    assert_eq!(
        alloc::format!("{}", diagnostic),
        "priority list #3: Value variable 'x' not found"
    );
}

fn nested_not(depth: usize) -> Rotation {
    let mut value = APLValue::constant("true");
    for _ in 0..depth {
        value = APLValue::not(value);
    }
    Rotation::apl(vec![cast(1).with_condition(value)])
}

#[test]
fn test_scale_decode_rejects_deep_nesting() {
    let shallow = nested_not(10);
    let deep = nested_not(crate::limits::MAX_DECODE_DEPTH as usize + 50);

    let decoded = Rotation::from_scale(&parity_scale_codec::Encode::encode(&shallow)).unwrap();
    assert_eq!(decoded, shallow);
    let err = Rotation::from_scale(&parity_scale_codec::Encode::encode(&deep)).unwrap_err();
    assert!(matches!(err, AplError::InvalidEncoding { .. }));
}
