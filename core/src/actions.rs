//! Actions
//!
//! An [`APLAction`] is an optional guard condition plus exactly one action
//! payload. Actions that nest other actions (`sequence`, `strictSequence`,
//! `schedule`) are executed as a unit and are never spliced into.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::types::{is_false, APLValueVariable, ActionId, UnitReference};
use crate::values::{APLValue, Empty};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
pub struct APLAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<APLValue>,
    #[serde(flatten)]
    pub action: Option<ActionKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    // Casting
    CastSpell(CastSpell),
    ChannelSpell(ChannelSpell),
    Multidot(Multidot),
    AutocastOtherCooldowns(Empty),

    // Timing
    Wait(Wait),
    WaitUntil(WaitUntil),
    Schedule(Schedule),

    // Sequences
    Sequence(Sequence),
    ResetSequence(ResetSequence),
    StrictSequence(StrictSequence),

    // Misc
    ActivateAura(AuraAction),
    CancelAura(AuraAction),
    TriggerIcd(AuraAction),
    ItemSwap(ItemSwap),
    Move(Move),
    CustomRotation(Empty),

    // Groups
    GroupReference(GroupReference),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct CastSpell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_id: Option<ActionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<UnitReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelSpell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_id: Option<ActionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<UnitReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupt_if: Option<APLValue>,
    #[serde(skip_serializing_if = "is_false")]
    pub allow_recast: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct Multidot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_id: Option<ActionId>,
    pub max_dots: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_overlap: Option<APLValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct Wait {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<APLValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct WaitUntil {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<APLValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    /// Comma-separated list of times, e.g. `"0s, 60s"`
    pub schedule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_action: Option<Box<APLAction>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct Sequence {
    pub name: String,
    pub actions: Vec<APLAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetSequence {
    pub sequence_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct StrictSequence {
    pub actions: Vec<APLAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct AuraAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aura_id: Option<ActionId>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo,
)]
pub enum SwapSet {
    #[default]
    Unknown,
    Main,
    Swap1,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemSwap {
    pub swap_set: SwapSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct Move {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_from_target: Option<APLValue>,
}

/// Invocation of a named group, with per-invocation variable overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupReference {
    pub group_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<APLValueVariable>,
}

// ==========================================
// CONSTRUCTORS
// ==========================================

impl APLAction {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            condition: None,
            action: Some(kind),
        }
    }

    pub fn with_condition(mut self, condition: APLValue) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn cast_spell(spell_id: i32) -> Self {
        Self::new(ActionKind::CastSpell(CastSpell {
            spell_id: Some(ActionId::spell(spell_id)),
            target: None,
        }))
    }

    pub fn wait(duration: APLValue) -> Self {
        Self::new(ActionKind::Wait(Wait {
            duration: Some(duration),
        }))
    }

    pub fn sequence(name: impl Into<String>, actions: Vec<APLAction>) -> Self {
        Self::new(ActionKind::Sequence(Sequence {
            name: name.into(),
            actions,
        }))
    }

    pub fn strict_sequence(actions: Vec<APLAction>) -> Self {
        Self::new(ActionKind::StrictSequence(StrictSequence { actions }))
    }

    pub fn schedule(schedule: impl Into<String>, inner: APLAction) -> Self {
        Self::new(ActionKind::Schedule(Schedule {
            schedule: schedule.into(),
            inner_action: Some(Box::new(inner)),
        }))
    }

    pub fn group_ref(group_name: impl Into<String>) -> Self {
        Self::new(ActionKind::GroupReference(GroupReference {
            group_name: group_name.into(),
            variables: Vec::new(),
        }))
    }

    /// Add an override to a group reference. No effect on other actions.
    pub fn with_override(mut self, name: impl Into<String>, value: APLValue) -> Self {
        if let Some(ActionKind::GroupReference(r)) = &mut self.action {
            r.variables.push(APLValueVariable::new(name, value));
        }
        self
    }
}

// ==========================================
// TRAVERSAL
// ==========================================

impl ActionKind {
    /// Actions nested inside this one
    pub fn nested_actions(&self) -> Vec<&APLAction> {
        match self {
            ActionKind::Sequence(s) => s.actions.iter().collect(),
            ActionKind::StrictSequence(s) => s.actions.iter().collect(),
            ActionKind::Schedule(s) => s.inner_action.as_deref().into_iter().collect(),
            _ => vec![],
        }
    }

    /// Value slots carried directly by this action (not its guard)
    pub fn values(&self) -> Vec<&APLValue> {
        match self {
            ActionKind::ChannelSpell(c) => c.interrupt_if.iter().collect(),
            ActionKind::Multidot(m) => m.max_overlap.iter().collect(),
            ActionKind::Wait(w) => w.duration.iter().collect(),
            ActionKind::WaitUntil(w) => w.condition.iter().collect(),
            ActionKind::Move(m) => m.range_from_target.iter().collect(),
            ActionKind::GroupReference(g) => {
                g.variables.iter().filter_map(|v| v.value.as_ref()).collect()
            }
            _ => vec![],
        }
    }

    pub fn unit_refs(&self) -> Vec<&UnitReference> {
        match self {
            ActionKind::CastSpell(c) => c.target.iter().collect(),
            ActionKind::ChannelSpell(c) => c.target.iter().collect(),
            _ => vec![],
        }
    }
}

impl APLAction {
    /// Visit every value root in this action: its guard, its own value
    /// slots, and those of nested actions.
    pub fn for_each_value(&self, f: &mut dyn FnMut(&APLValue)) {
        if let Some(condition) = &self.condition {
            f(condition);
        }
        if let Some(kind) = &self.action {
            for value in kind.values() {
                f(value);
            }
            for nested in kind.nested_actions() {
                nested.for_each_value(f);
            }
        }
    }
}
