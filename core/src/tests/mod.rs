mod assemble;
mod log;
mod wire;

use crate::*;
use alloc::vec::Vec;

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

const HEAL: i32 = 2061;

fn cast(id: i32) -> APLAction {
    APLAction::cast_spell(id)
}

fn health_above(percent: &str) -> APLValue {
    APLValue::cmp(
        CompareOp::OpGt,
        APLValue::new(ValueKind::CurrentHealthPercent(UnitValue::default())),
        APLValue::constant(percent),
    )
}

fn time_above(rhs: APLValue) -> APLValue {
    APLValue::cmp(CompareOp::OpGt, APLValue::current_time(), rhs)
}

/// Cast `id` once the fight is past `rhs`
fn cast_after(id: i32, rhs: APLValue) -> APLAction {
    cast(id).with_condition(time_above(rhs))
}

/// Spell ids cast by each action, 0 for anything else
fn spell_ids(actions: &[APLAction]) -> Vec<i32> {
    actions
        .iter()
        .map(|a| match &a.action {
            Some(ActionKind::CastSpell(CastSpell {
                spell_id: Some(ActionId {
                    id: ActionIdKind::SpellId(id),
                    ..
                }),
                ..
            })) => *id,
            _ => 0,
        })
        .collect()
}

fn kinds(assembly: &Assembly) -> Vec<DiagnosticKind> {
    assembly.diagnostics.iter().map(|d| d.kind.clone()).collect()
}

fn count_kind(assembly: &Assembly, pred: impl Fn(&DiagnosticKind) -> bool) -> usize {
    assembly.diagnostics.iter().filter(|d| pred(&d.kind)).count()
}

/// The right-hand side of a `cmp` guard
fn guard_rhs(action: &APLAction) -> &APLValue {
    match action.condition.as_ref().and_then(|c| c.value.as_ref()) {
        Some(ValueKind::Cmp(cmp)) => cmp.rhs.as_deref().expect("cmp without rhs"),
        other => panic!("expected a cmp guard, got {:?}", other),
    }
}

fn assert_closed(resolved: &ResolvedRotation) {
    let actions = resolved
        .priority_list
        .iter()
        .chain(resolved.prepull_actions.iter().map(|p| &p.action));
    for action in actions {
        action.for_each_value(&mut |value| {
            assert!(!value.has_variables(), "unresolved variable in {:?}", value)
        });
        if let Some(kind) = &action.action {
            assert!(
                !matches!(kind, ActionKind::GroupReference(_)),
                "group reference survived assembly"
            );
        }
    }
}
