//! Rotation containers and shared references
//!
//! The wire format is the protobuf-JSON shape the rotation editor saves:
//! camelCase field names, `oneof` payloads flattened into the parent object
//! under the variant's name, and default-valued fields omitted.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use parity_scale_codec::{Decode, DecodeLimit, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::actions::{APLAction, ActionKind, GroupReference};
use crate::values::APLValue;

pub(crate) fn is_zero(n: &i32) -> bool {
    *n == 0
}

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

/// Stable identity of a value node. Ignored by every equality check.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Encode,
    Decode,
    TypeInfo,
)]
pub struct Uuid {
    pub value: String,
}

impl Uuid {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

// ==========================================
// IDENTIFIERS
// ==========================================

/// Which game object an action or value refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub enum ActionIdKind {
    SpellId(i32),
    ItemId(i32),
    OtherId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
pub struct ActionId {
    #[serde(flatten)]
    pub id: ActionIdKind,
    /// Disambiguates multiple spells sharing an id (e.g. ranks)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub tag: i32,
}

impl ActionId {
    pub fn spell(id: i32) -> Self {
        Self {
            id: ActionIdKind::SpellId(id),
            tag: 0,
        }
    }

    pub fn item(id: i32) -> Self {
        Self {
            id: ActionIdKind::ItemId(id),
            tag: 0,
        }
    }
}

/// Unit kinds a reference can point at
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo,
)]
pub enum UnitType {
    #[default]
    Unknown,
    Player,
    Target,
    Pet,
    #[serde(rename = "Self")]
    SelfUnit,
    CurrentTarget,
    PreviousTarget,
    NextTarget,
}

/// Reference to a unit in the encounter, optionally owned by another unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitReference {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    #[serde(skip_serializing_if = "is_zero")]
    pub index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Box<UnitReference>>,
}

impl UnitReference {
    pub fn of(unit_type: UnitType) -> Self {
        Self {
            unit_type,
            index: 0,
            owner: None,
        }
    }

    /// Describe what is wrong with this reference, if anything.
    ///
    /// An absent reference (all defaults) is valid and means "use the
    /// action's natural default unit". A pet's owner must name a unit.
    pub fn validate(&self) -> Option<&'static str> {
        if self.index < 0 {
            return Some("unit index must not be negative");
        }
        if self.unit_type == UnitType::Unknown && (self.index != 0 || self.owner.is_some()) {
            return Some("unit reference has an index or owner but no type");
        }
        match (&self.unit_type, &self.owner) {
            (UnitType::Pet, None) => Some("pet reference needs an owner"),
            (UnitType::Pet, Some(owner)) if owner.unit_type == UnitType::Pet => {
                Some("pet owner cannot be another pet")
            }
            (UnitType::Pet, Some(owner)) if owner.unit_type == UnitType::Unknown => {
                Some("pet owner needs a type")
            }
            (UnitType::Pet, Some(owner)) => owner.validate(),
            (_, Some(_)) => Some("only pet references have an owner"),
            (_, None) => None,
        }
    }
}

// ==========================================
// ROTATION CONTAINERS
// ==========================================

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo,
)]
pub enum RotationType {
    #[default]
    #[serde(rename = "TypeUnknown")]
    Unknown,
    #[serde(rename = "TypeAuto")]
    Auto,
    #[serde(rename = "TypeSimple")]
    Simple,
    #[serde(rename = "TypeAPL")]
    Apl,
}

/// An entry of the priority list, or of a group's action list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct ListItem {
    /// Hidden items are kept in the document but never executed
    #[serde(skip_serializing_if = "is_false")]
    pub hide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<APLAction>,
}

impl ListItem {
    pub fn new(action: APLAction) -> Self {
        Self {
            hide: false,
            action: Some(action),
        }
    }

    pub fn hidden(action: APLAction) -> Self {
        Self {
            hide: true,
            action: Some(action),
        }
    }
}

/// An action executed once before combat, at `doAtValue` (zero or negative)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct PrepullAction {
    #[serde(skip_serializing_if = "is_false")]
    pub hide: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<APLAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_at_value: Option<APLValue>,
}

impl PrepullAction {
    pub fn new(action: APLAction, do_at: &str) -> Self {
        Self {
            hide: false,
            action: Some(action),
            do_at_value: Some(APLValue::constant(do_at)),
        }
    }
}

/// A named value slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct APLValueVariable {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<APLValue>,
}

impl APLValueVariable {
    pub fn new(name: impl Into<String>, value: APLValue) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }
}

/// A named, reusable action list with its own variable table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub name: String,
    pub actions: Vec<ListItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<APLValueVariable>,
}

impl Group {
    pub fn new(name: impl Into<String>, actions: Vec<APLAction>) -> Self {
        Self {
            name: name.into(),
            actions: actions.into_iter().map(ListItem::new).collect(),
            variables: Vec::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: APLValue) -> Self {
        self.variables.push(APLValueVariable::new(name, value));
        self
    }

    /// Names of every placeholder used by this group's actions, in first-seen
    /// order. These are the holes a reference is expected to fill.
    pub fn placeholder_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !names.iter().any(|n| n == name) {
                names.push(name.into());
            }
        };
        for item in &self.actions {
            if let Some(action) = &item.action {
                action.for_each_value(&mut |value| {
                    value.walk(&mut |node| {
                        if let Some(name) = node.placeholder_name() {
                            push(name);
                        }
                    })
                });
            }
        }
        names
    }
}

/// Options for the specialization-specific simple rotation, stored as raw JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct SimpleRotation {
    pub spec_rotation_json: String,
}

/// The user-authored rotation document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct Rotation {
    #[serde(rename = "type")]
    pub rotation_type: RotationType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prepull_actions: Vec<PrepullAction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub priority_list: Vec<ListItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub value_variables: Vec<APLValueVariable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple: Option<SimpleRotation>,
}

impl Rotation {
    /// An authored APL rotation with the given priority list
    pub fn apl(priority_list: Vec<APLAction>) -> Self {
        Self {
            rotation_type: RotationType::Apl,
            priority_list: priority_list.into_iter().map(ListItem::new).collect(),
            ..Default::default()
        }
    }

    pub fn auto() -> Self {
        Self {
            rotation_type: RotationType::Auto,
            ..Default::default()
        }
    }

    pub fn simple(spec_rotation_json: impl Into<String>) -> Self {
        Self {
            rotation_type: RotationType::Simple,
            simple: Some(SimpleRotation {
                spec_rotation_json: spec_rotation_json.into(),
            }),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: APLValue) -> Self {
        self.value_variables.push(APLValueVariable::new(name, value));
        self
    }

    pub fn with_prepull(mut self, action: PrepullAction) -> Self {
        self.prepull_actions.push(action);
        self
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().rev().find(|g| g.name == name)
    }
}

impl GroupReference {
    /// Bring this reference's override list in line with the placeholders the
    /// group currently uses: missing names get an empty `variableRef`
    /// override, existing overrides keep their values and names the group no
    /// longer uses are dropped. Order follows the group's placeholders.
    pub fn sync_overrides(&mut self, group: &Group) {
        let mut current = core::mem::take(&mut self.variables);
        self.variables = group
            .placeholder_names()
            .into_iter()
            .map(|name| match current.iter().position(|v| v.name == name) {
                Some(pos) => current.swap_remove(pos),
                None => APLValueVariable::new(name, APLValue::variable_ref("")),
            })
            .collect();
    }
}

// ==========================================
// WIRE HELPERS
// ==========================================

#[cfg(feature = "std")]
impl Rotation {
    pub fn from_json(json: &str) -> crate::error::AplResult<Self> {
        serde_json::from_str(json).map_err(|e| crate::error::AplError::InvalidJson {
            message: alloc::format!("{}", e),
        })
    }

    pub fn to_json(&self) -> crate::error::AplResult<String> {
        serde_json::to_string(self).map_err(|e| crate::error::AplError::InvalidJson {
            message: alloc::format!("{}", e),
        })
    }
}

impl Rotation {
    /// Decode a SCALE-encoded rotation. Value trees nested deeper than
    /// [`MAX_DECODE_DEPTH`](crate::limits::MAX_DECODE_DEPTH) are rejected.
    pub fn from_scale(mut bytes: &[u8]) -> crate::error::AplResult<Self> {
        Self::decode_all_with_depth_limit(crate::limits::MAX_DECODE_DEPTH, &mut bytes).map_err(
            |e| crate::error::AplError::InvalidEncoding {
                message: alloc::format!("{:?}", e),
            },
        )
    }
}

/// Priority list entries the engine should see: hidden and empty items removed
pub(crate) fn visible_actions(items: &[ListItem]) -> impl Iterator<Item = (usize, &APLAction)> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.hide)
        .filter_map(|(i, item)| item.action.as_ref().map(|a| (i, a)))
        .filter(|(_, a)| a.action.is_some())
}

impl APLAction {
    pub fn group_reference(&self) -> Option<&GroupReference> {
        match &self.action {
            Some(ActionKind::GroupReference(r)) => Some(r),
            _ => None,
        }
    }
}
