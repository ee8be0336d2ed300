//! Rotation assembly
//!
//! Turns an authored [`Rotation`] into the flat, closed [`ResolvedRotation`]
//! the simulation consumes:
//!
//! 1. build the group and variable tables, flagging duplicate names
//! 2. resolve rotation-level variables
//! 3. resolve the priority list, then the prepull list
//! 4. splice group references
//! 5. order prepull actions by their timing
//!
//! Assembly never fails. Every problem becomes a [`Diagnostic`] and the
//! offending piece is replaced or dropped.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::actions::APLAction;
use crate::constant::ConstValue;
use crate::error::{Diagnostic, DiagnosticKind, Site};
use crate::limits::ResolveConfig;
use crate::log;
use crate::resolve::Resolver;
use crate::types::{visible_actions, ListItem, PrepullAction, Rotation, RotationType};
use crate::values::APLValue;

/// A prepull action with its timing already evaluated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrepullAction {
    pub action: APLAction,
    pub do_at_value: APLValue,
    /// Offset from pull in nanoseconds, zero or negative
    pub do_at_nanos: i64,
}

/// A rotation with no variable references, placeholders or group references
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRotation {
    /// Ordered by `do_at_nanos`, ties keep authored order
    pub prepull_actions: Vec<ResolvedPrepullAction>,
    /// Authored order; the first ready action wins
    pub priority_list: Vec<APLAction>,
}

impl ResolvedRotation {
    /// An APL rotation that assembles back to this one
    pub fn to_rotation(&self) -> Rotation {
        Rotation {
            rotation_type: RotationType::Apl,
            prepull_actions: self
                .prepull_actions
                .iter()
                .map(|p| PrepullAction {
                    hide: false,
                    action: Some(p.action.clone()),
                    do_at_value: Some(p.do_at_value.clone()),
                })
                .collect(),
            priority_list: self
                .priority_list
                .iter()
                .cloned()
                .map(ListItem::new)
                .collect(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.priority_list.is_empty() && self.prepull_actions.is_empty()
    }
}

/// Result of assembling a rotation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    pub resolved: ResolvedRotation,
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    /// True if any diagnostic disqualifies the rotation from execution
    pub fn has_hard_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_hard)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_hard())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_hard())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionList {
    PriorityList,
    Prepull,
}

/// Where an assembly currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
    Start,
    ValidatingNames,
    ResolvingVariables,
    ResolvingActions(ActionList),
    ExpandingGroups,
    Sorting,
    Done,
}

/// Assemble with the default limits
pub fn assemble(rotation: &Rotation) -> Assembly {
    assemble_with(rotation, &ResolveConfig::default())
}

pub fn assemble_with(rotation: &Rotation, config: &ResolveConfig) -> Assembly {
    Assembler::new(rotation, config).run()
}

struct PendingPrepull {
    index: u32,
    action: APLAction,
    do_at_value: APLValue,
    do_at_nanos: i64,
}

struct Assembler<'a> {
    rotation: &'a Rotation,
    resolver: Resolver<'a>,
    stage: AssemblyStage,
    priority: Vec<(u32, APLAction)>,
    prepull: Vec<PendingPrepull>,
    resolved: ResolvedRotation,
}

impl<'a> Assembler<'a> {
    fn new(rotation: &'a Rotation, config: &ResolveConfig) -> Self {
        Self {
            rotation,
            resolver: Resolver::new(config),
            stage: AssemblyStage::Start,
            priority: Vec::new(),
            prepull: Vec::new(),
            resolved: ResolvedRotation::default(),
        }
    }

    fn advance(&mut self, next: AssemblyStage) {
        log::stage(&self.stage, &next);
        self.stage = next;
    }

    fn run(mut self) -> Assembly {
        let rotation = self.rotation;

        self.advance(AssemblyStage::ValidatingNames);
        self.resolver.declare_groups(&rotation.groups);
        self.resolver.declare_variables(&rotation.value_variables);

        self.advance(AssemblyStage::ResolvingVariables);
        self.resolver.resolve_rotation_variables();

        self.advance(AssemblyStage::ResolvingActions(ActionList::PriorityList));
        for (index, action) in visible_actions(&rotation.priority_list) {
            self.resolver.site = Site::PriorityList {
                index: index as u32,
            };
            if let Some(resolved) = self.resolver.resolve_action(action, 0) {
                self.priority.push((index as u32, resolved));
            }
        }

        self.advance(AssemblyStage::ResolvingActions(ActionList::Prepull));
        self.resolve_prepull();

        self.advance(AssemblyStage::ExpandingGroups);
        for (index, action) in core::mem::take(&mut self.priority) {
            self.resolver.site = Site::PriorityList { index };
            let expanded = self.resolver.expand_actions(vec![action]);
            self.resolved.priority_list.extend(expanded);
        }
        for pending in core::mem::take(&mut self.prepull) {
            self.resolver.site = Site::Prepull {
                index: pending.index,
            };
            for action in self.resolver.expand_actions(vec![pending.action]) {
                self.resolved.prepull_actions.push(ResolvedPrepullAction {
                    action,
                    do_at_value: pending.do_at_value.clone(),
                    do_at_nanos: pending.do_at_nanos,
                });
            }
        }

        self.advance(AssemblyStage::Sorting);
        // Stable: equal times keep authored order
        self.resolved
            .prepull_actions
            .sort_by_key(|p| p.do_at_nanos);

        self.advance(AssemblyStage::Done);
        log::info(&format!(
            "assembled {} actions, {} prepull, {} diagnostics",
            self.resolved.priority_list.len(),
            self.resolved.prepull_actions.len(),
            self.resolver.diagnostics.len()
        ));
        Assembly {
            resolved: self.resolved,
            diagnostics: self.resolver.diagnostics,
        }
    }

    /// Resolve visible prepull items whose timing is a constant, non-positive
    /// duration. Anything else is reported and skipped.
    fn resolve_prepull(&mut self) {
        let rotation = self.rotation;
        for (index, item) in rotation.prepull_actions.iter().enumerate() {
            if item.hide {
                continue;
            }
            let action = match &item.action {
                Some(action) if action.action.is_some() => action,
                _ => continue,
            };
            self.resolver.site = Site::Prepull {
                index: index as u32,
            };
            let do_at_value = self.resolver.resolve_optional(&item.do_at_value, 0);
            let text = do_at_value.as_ref().and_then(APLValue::const_text).unwrap_or("");
            let do_at_nanos = match ConstValue::parse(text).as_duration() {
                Some(nanos) if nanos <= 0 => nanos,
                _ => {
                    let uuid = item.do_at_value.as_ref().and_then(|v| v.uuid.clone());
                    self.resolver.report(
                        DiagnosticKind::InvalidPrepullTime { value: text.into() },
                        uuid,
                    );
                    continue;
                }
            };
            let do_at_value = match do_at_value {
                Some(value) => value,
                None => continue,
            };
            if let Some(action) = self.resolver.resolve_action(action, 0) {
                self.prepull.push(PendingPrepull {
                    index: index as u32,
                    action,
                    do_at_value,
                    do_at_nanos,
                });
            }
        }
    }
}
