//! Group expansion
//!
//! A group reference in a priority-style list (the priority list, prepull
//! actions, or another group's actions) is replaced by the group's visible
//! actions, resolved in a fresh scope. The reference's own guard is
//! conjoined onto every spliced action, so the first ready spliced action
//! wins exactly as the reference would have.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use crate::actions::{APLAction, ActionKind, GroupReference};
use crate::error::DiagnosticKind;
use crate::log;
use crate::resolve::Resolver;
use crate::types::visible_actions;
use crate::values::APLValue;

impl<'a> Resolver<'a> {
    /// Splice every group reference in a resolved, priority-style list
    pub fn expand_actions(&mut self, actions: Vec<APLAction>) -> Vec<APLAction> {
        let mut expanded = Vec::with_capacity(actions.len());
        for action in actions {
            match action.action {
                Some(ActionKind::GroupReference(reference)) => {
                    let spliced = self.expand_group(&reference, action.condition);
                    expanded.extend(spliced);
                }
                Some(kind) => {
                    let mut action = APLAction {
                        condition: action.condition,
                        action: Some(kind),
                    };
                    self.reject_nested_groups(&mut action);
                    expanded.push(action);
                }
                None => {}
            }
        }
        expanded
    }

    fn expand_group(
        &mut self,
        reference: &GroupReference,
        guard: Option<APLValue>,
    ) -> Vec<APLAction> {
        let name = reference.group_name.as_str();
        let group = match self.groups.get(name) {
            Some(group) => *group,
            None => {
                self.report(DiagnosticKind::UnresolvedGroup { name: name.into() }, None);
                return vec![];
            }
        };
        if !self.group_stack.enter(name.into()) {
            self.report(DiagnosticKind::CyclicGroupReference { name: name.into() }, None);
            return vec![];
        }
        if let Err(reason) = self.limits.enter_group() {
            self.report(DiagnosticKind::LimitExceeded { reason }, None);
            self.group_stack.exit();
            return vec![];
        }
        log::action(
            "expand",
            &format!("group={} depth={}", name, self.group_stack.depth()),
        );

        self.push_frame(group, &reference.variables);
        let depth = self.depth();
        let resolved: Vec<APLAction> = visible_actions(&group.actions)
            .filter_map(|(_, action)| self.resolve_action(action, depth))
            .collect();
        // Only this level's own actions; nested groups count theirs
        let own = resolved.iter().filter(|a| a.group_reference().is_none()).count();
        let expanded = match self.limits.record_actions(own as u32) {
            Ok(()) => self.expand_actions(resolved),
            Err(reason) => {
                self.report(DiagnosticKind::LimitExceeded { reason }, None);
                vec![]
            }
        };
        self.pop_frame();
        self.limits.exit_group();
        self.group_stack.exit();

        match guard {
            Some(guard) => expanded
                .into_iter()
                .map(|action| self.conjoin(&guard, action))
                .collect(),
            None => expanded,
        }
    }

    /// Guard `action` with `guard` as well as its own condition
    fn conjoin(&mut self, guard: &APLValue, mut action: APLAction) -> APLAction {
        let outer = self.fresh_copy(guard);
        action.condition = Some(match action.condition.take() {
            None => outer,
            Some(inner) => APLValue {
                uuid: Some(self.mint_uuid()),
                ..APLValue::and(vec![outer, inner])
            },
        });
        action
    }

    /// Drop group references from slots that run as a unit (sequences,
    /// schedules). Splicing there would change what the slot means.
    fn reject_nested_groups(&mut self, action: &mut APLAction) {
        match &mut action.action {
            Some(ActionKind::Sequence(s)) => self.reject_in_list(&mut s.actions),
            Some(ActionKind::StrictSequence(s)) => self.reject_in_list(&mut s.actions),
            Some(ActionKind::Schedule(s)) => {
                let mut inner: Vec<APLAction> =
                    s.inner_action.take().map(|b| *b).into_iter().collect();
                self.reject_in_list(&mut inner);
                s.inner_action = inner.pop().map(Box::new);
            }
            _ => {}
        }
    }

    fn reject_in_list(&mut self, actions: &mut Vec<APLAction>) {
        let mut kept = Vec::with_capacity(actions.len());
        for mut action in core::mem::take(actions) {
            if let Some(reference) = action.group_reference() {
                self.report(
                    DiagnosticKind::NestedGroupReference {
                        name: reference.group_name.clone(),
                    },
                    None,
                );
                continue;
            }
            self.reject_nested_groups(&mut action);
            kept.push(action);
        }
        *actions = kept;
    }
}
