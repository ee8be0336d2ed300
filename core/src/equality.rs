//! Rotation equality
//!
//! Used to tell whether a saved rotation matches a preset. Node identity is
//! ignored throughout, priority and prepull lists compare in order, and
//! groups and variables compare as name-keyed tables (last definition wins).

use alloc::collections::BTreeMap;

use crate::types::{APLValueVariable, Group, Rotation, RotationType, SimpleRotation};

/// Decide whether two rotations describe the same behaviour
pub fn is_equal_rotation(a: &Rotation, b: &Rotation) -> bool {
    if a.rotation_type != b.rotation_type {
        return false;
    }
    match a.rotation_type {
        RotationType::Auto => true,
        RotationType::Simple => simple_options_equal(a.simple.as_ref(), b.simple.as_ref()),
        RotationType::Apl | RotationType::Unknown => {
            a.priority_list == b.priority_list
                && a.prepull_actions == b.prepull_actions
                && groups_equal(&a.groups, &b.groups)
                && variables_equal(&a.value_variables, &b.value_variables)
        }
    }
}

fn variables_equal(a: &[APLValueVariable], b: &[APLValueVariable]) -> bool {
    fn table(vars: &[APLValueVariable]) -> BTreeMap<&str, &APLValueVariable> {
        vars.iter().map(|v| (v.name.as_str(), v)).collect()
    }
    table(a) == table(b)
}

fn groups_equal(a: &[Group], b: &[Group]) -> bool {
    fn table(groups: &[Group]) -> BTreeMap<&str, &Group> {
        groups.iter().map(|g| (g.name.as_str(), g)).collect()
    }
    let (a, b) = (table(a), table(b));
    a.len() == b.len()
        && a.iter().all(|(name, ga)| {
            b.get(name).map_or(false, |gb| {
                ga.actions == gb.actions && variables_equal(&ga.variables, &gb.variables)
            })
        })
}

#[cfg(feature = "std")]
fn simple_options_equal(a: Option<&SimpleRotation>, b: Option<&SimpleRotation>) -> bool {
    fn parse(s: Option<&SimpleRotation>) -> Option<serde_json::Value> {
        match s.map(|s| s.spec_rotation_json.trim()) {
            None | Some("") => Some(serde_json::Value::Object(Default::default())),
            Some(json) => serde_json::from_str(json).ok(),
        }
    }
    match (parse(a), parse(b)) {
        // serde_json objects compare as maps, so key order does not matter
        (Some(a), Some(b)) => a == b,
        _ => a.map(|s| &s.spec_rotation_json) == b.map(|s| &s.spec_rotation_json),
    }
}

#[cfg(not(feature = "std"))]
fn simple_options_equal(a: Option<&SimpleRotation>, b: Option<&SimpleRotation>) -> bool {
    let text = |s: Option<&SimpleRotation>| s.map(|s| s.spec_rotation_json.trim()).unwrap_or("");
    text(a) == text(b)
}

impl Rotation {
    pub fn is_equal(&self, other: &Rotation) -> bool {
        is_equal_rotation(self, other)
    }
}
