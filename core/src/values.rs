//! Value expressions
//!
//! An [`APLValue`] is a tree of typed expressions evaluated each time the
//! simulation consults the priority list. Equality between values is
//! structural and ignores node identity (`uuid`).

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::constant::ConstValue;
use crate::types::{ActionId, UnitReference, Uuid};

/// A value expression node
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode, TypeInfo)]
pub struct APLValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(flatten)]
    pub value: Option<ValueKind>,
}

impl PartialEq for APLValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    // Operators
    Const(ValueConst),
    And(ValueList),
    Or(ValueList),
    Not(ValueNot),
    Cmp(ValueCompare),
    Math(ValueMath),
    Max(ValueList),
    Min(ValueList),

    // Encounter
    CurrentTime(Empty),
    RemainingTime(Empty),
    NumberTargets(Empty),

    // Resources
    CurrentHealth(UnitValue),
    CurrentHealthPercent(UnitValue),
    CurrentMana(Empty),
    CurrentManaPercent(Empty),

    // Auras
    AuraIsActive(AuraValue),
    AuraRemainingTime(AuraValue),
    AuraNumStacks(AuraValue),

    // Spells
    SpellIsReady(SpellValue),
    SpellTimeToReady(SpellValue),
    SpellCanCast(SpellValue),

    // Dots
    DotIsActive(DotValue),
    DotRemainingTime(DotValue),

    // Variables
    VariableRef(VariableName),
    VariablePlaceholder(VariableName),
}

/// Payload for value kinds that carry no fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
pub struct Empty {}

/// A literal. The string is typed on use, see [`ConstValue`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct ValueConst {
    pub val: String,
}

impl PartialEq for ValueConst {
    fn eq(&self, other: &Self) -> bool {
        ConstValue::parse(&self.val) == ConstValue::parse(&other.val)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct ValueList {
    pub vals: Vec<APLValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct ValueNot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<Box<APLValue>>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo,
)]
pub enum CompareOp {
    #[default]
    OpUnknown,
    OpEq,
    OpNe,
    OpLt,
    OpLe,
    OpGt,
    OpGe,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct ValueCompare {
    pub op: CompareOp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lhs: Option<Box<APLValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhs: Option<Box<APLValue>>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo,
)]
pub enum MathOp {
    #[default]
    OpUnknown,
    OpAdd,
    OpSub,
    OpMul,
    OpDiv,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct ValueMath {
    pub op: MathOp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lhs: Option<Box<APLValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhs: Option<Box<APLValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_unit: Option<UnitReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct AuraValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_unit: Option<UnitReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aura_id: Option<ActionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct SpellValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_id: Option<ActionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase", default)]
pub struct DotValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_unit: Option<UnitReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_id: Option<ActionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(default)]
pub struct VariableName {
    pub name: String,
}

// ==========================================
// CONSTRUCTORS
// ==========================================

impl APLValue {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            uuid: None,
            value: Some(kind),
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(Uuid::new(uuid));
        self
    }

    pub fn constant(val: impl Into<String>) -> Self {
        Self::new(ValueKind::Const(ValueConst { val: val.into() }))
    }

    pub fn variable_ref(name: impl Into<String>) -> Self {
        Self::new(ValueKind::VariableRef(VariableName { name: name.into() }))
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(ValueKind::VariablePlaceholder(VariableName { name: name.into() }))
    }

    pub fn and(vals: Vec<APLValue>) -> Self {
        Self::new(ValueKind::And(ValueList { vals }))
    }

    pub fn or(vals: Vec<APLValue>) -> Self {
        Self::new(ValueKind::Or(ValueList { vals }))
    }

    pub fn not(val: APLValue) -> Self {
        Self::new(ValueKind::Not(ValueNot {
            val: Some(Box::new(val)),
        }))
    }

    pub fn cmp(op: CompareOp, lhs: APLValue, rhs: APLValue) -> Self {
        Self::new(ValueKind::Cmp(ValueCompare {
            op,
            lhs: Some(Box::new(lhs)),
            rhs: Some(Box::new(rhs)),
        }))
    }

    pub fn math(op: MathOp, lhs: APLValue, rhs: APLValue) -> Self {
        Self::new(ValueKind::Math(ValueMath {
            op,
            lhs: Some(Box::new(lhs)),
            rhs: Some(Box::new(rhs)),
        }))
    }

    pub fn current_time() -> Self {
        Self::new(ValueKind::CurrentTime(Empty {}))
    }

    pub fn current_mana_percent() -> Self {
        Self::new(ValueKind::CurrentManaPercent(Empty {}))
    }

    pub fn spell_is_ready(spell_id: i32) -> Self {
        Self::new(ValueKind::SpellIsReady(SpellValue {
            spell_id: Some(ActionId::spell(spell_id)),
        }))
    }

    pub fn aura_is_active(aura_id: i32) -> Self {
        Self::new(ValueKind::AuraIsActive(AuraValue {
            source_unit: None,
            aura_id: Some(ActionId::spell(aura_id)),
        }))
    }

    pub fn dot_is_active(spell_id: i32) -> Self {
        Self::new(ValueKind::DotIsActive(DotValue {
            target_unit: None,
            spell_id: Some(ActionId::spell(spell_id)),
        }))
    }
}

// ==========================================
// TRAVERSAL
// ==========================================

impl APLValue {
    /// Name of the variable this node refers to, for `variableRef` nodes
    pub fn variable_name(&self) -> Option<&str> {
        match &self.value {
            Some(ValueKind::VariableRef(v)) => Some(&v.name),
            _ => None,
        }
    }

    /// Name of the placeholder this node stands for, for `variablePlaceholder` nodes
    pub fn placeholder_name(&self) -> Option<&str> {
        match &self.value {
            Some(ValueKind::VariablePlaceholder(v)) => Some(&v.name),
            _ => None,
        }
    }

    /// The literal text of a `const` node
    pub fn const_text(&self) -> Option<&str> {
        match &self.value {
            Some(ValueKind::Const(c)) => Some(&c.val),
            _ => None,
        }
    }

    /// Visit this node and every descendant, parents first
    pub fn walk(&self, f: &mut dyn FnMut(&APLValue)) {
        f(self);
        if let Some(kind) = &self.value {
            for child in kind.children() {
                child.walk(f);
            }
        }
    }

    /// Visit this node and every descendant mutably, parents first
    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut APLValue)) {
        f(self);
        if let Some(kind) = &mut self.value {
            for child in kind.children_mut() {
                child.walk_mut(f);
            }
        }
    }

    /// Number of nodes in this tree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// True if a variable reference or placeholder remains anywhere in the tree
    pub fn has_variables(&self) -> bool {
        let mut found = false;
        self.walk(&mut |node| {
            found |= node.variable_name().is_some() || node.placeholder_name().is_some();
        });
        found
    }
}

impl ValueKind {
    pub fn children(&self) -> Vec<&APLValue> {
        match self {
            ValueKind::And(l) | ValueKind::Or(l) | ValueKind::Max(l) | ValueKind::Min(l) => {
                l.vals.iter().collect()
            }
            ValueKind::Not(n) => n.val.as_deref().into_iter().collect(),
            ValueKind::Cmp(c) => c.lhs.as_deref().into_iter().chain(c.rhs.as_deref()).collect(),
            ValueKind::Math(m) => m.lhs.as_deref().into_iter().chain(m.rhs.as_deref()).collect(),
            _ => vec![],
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut APLValue> {
        match self {
            ValueKind::And(l) | ValueKind::Or(l) | ValueKind::Max(l) | ValueKind::Min(l) => {
                l.vals.iter_mut().collect()
            }
            ValueKind::Not(n) => n.val.as_deref_mut().into_iter().collect(),
            ValueKind::Cmp(c) => c
                .lhs
                .as_deref_mut()
                .into_iter()
                .chain(c.rhs.as_deref_mut())
                .collect(),
            ValueKind::Math(m) => m
                .lhs
                .as_deref_mut()
                .into_iter()
                .chain(m.rhs.as_deref_mut())
                .collect(),
            _ => vec![],
        }
    }

    /// Unit references carried directly by this node
    pub fn unit_refs(&self) -> Vec<&UnitReference> {
        match self {
            ValueKind::CurrentHealth(u) | ValueKind::CurrentHealthPercent(u) => {
                u.source_unit.iter().collect()
            }
            ValueKind::AuraIsActive(a)
            | ValueKind::AuraRemainingTime(a)
            | ValueKind::AuraNumStacks(a) => a.source_unit.iter().collect(),
            ValueKind::DotIsActive(d) | ValueKind::DotRemainingTime(d) => {
                d.target_unit.iter().collect()
            }
            _ => vec![],
        }
    }
}
