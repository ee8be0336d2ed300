//! Rotation editor for browser WASM builds
//!
//! Holds the rotation being edited and exposes assembly, validation and
//! preset matching to JavaScript via wasm-bindgen.

use apl_core::log;
use apl_core::{
    assemble, is_equal_rotation, select_rotation, ActionKind, AutoRotationProvider, Diagnostic,
    ResolvedRotation, Rotation, SelectedRotation, Severity,
};
use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// A diagnostic as shown next to the offending list item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticView {
    pub severity: Severity,
    pub message: String,
    pub diagnostic: Diagnostic,
}

impl From<&Diagnostic> for DiagnosticView {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            severity: diagnostic.severity(),
            message: format!("{}", diagnostic),
            diagnostic: diagnostic.clone(),
        }
    }
}

/// Result of assembling the edited rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyView {
    pub resolved: ResolvedRotation,
    pub diagnostics: Vec<DiagnosticView>,
    pub runnable: bool,
}

/// What the simulation will execute for the edited rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    /// "authored", "fallback", "simple" or "empty"
    pub source: String,
    pub resolved: Option<ResolvedRotation>,
    pub spec_rotation_json: Option<String>,
}

impl From<SelectedRotation> for SelectionView {
    fn from(selected: SelectedRotation) -> Self {
        let (source, resolved, spec_rotation_json) = match selected {
            SelectedRotation::Authored(r) => ("authored", Some(r), None),
            SelectedRotation::Fallback(r) => ("fallback", Some(r), None),
            SelectedRotation::Simple(s) => ("simple", None, Some(s.spec_rotation_json)),
            SelectedRotation::Empty => ("empty", None, None),
        };
        Self {
            source: source.into(),
            resolved,
            spec_rotation_json,
        }
    }
}

/// The rotation editor exposed to WASM
#[wasm_bindgen]
pub struct RotationEditor {
    rotation: Rotation,
    class_default: Option<Rotation>,
}

impl Default for RotationEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl RotationEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        log::info("=== APL EDITOR INITIALIZED ===");
        Self {
            rotation: Rotation::apl(Vec::new()),
            class_default: None,
        }
    }

    /// Replace the edited rotation with a saved one (JSON string)
    #[wasm_bindgen]
    pub fn load_json(&mut self, json: &str) -> Result<(), String> {
        self.rotation = Rotation::from_json(json).map_err(|e| format!("{}", e))?;
        log::debug(
            "load_json",
            &format!("{} priority items", self.rotation.priority_list.len()),
        );
        Ok(())
    }

    /// Replace the edited rotation with a SCALE-encoded one
    #[wasm_bindgen]
    pub fn load_scale(&mut self, bytes: &[u8]) -> Result<(), String> {
        self.rotation = Rotation::from_scale(bytes).map_err(|e| format!("{}", e))?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, String> {
        self.rotation.to_json().map_err(|e| format!("{}", e))
    }

    /// Replace the edited rotation from a JS object
    #[wasm_bindgen]
    pub fn set_rotation(&mut self, rotation_js: JsValue) -> Result<(), String> {
        self.rotation = serde_wasm_bindgen::from_value(rotation_js)
            .map_err(|e| format!("Failed to parse rotation: {:?}", e))?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn get_rotation(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.rotation).unwrap_or(JsValue::NULL)
    }

    /// Set the class default used when the edited rotation cannot run
    #[wasm_bindgen]
    pub fn set_class_default(&mut self, json: &str) -> Result<(), String> {
        self.class_default = Some(Rotation::from_json(json).map_err(|e| format!("{}", e))?);
        Ok(())
    }

    /// Assemble the edited rotation and report every problem found
    #[wasm_bindgen]
    pub fn assemble(&self) -> JsValue {
        let assembly = assemble(&self.rotation);
        let view = AssemblyView {
            runnable: !assembly.has_hard_errors(),
            diagnostics: assembly.diagnostics.iter().map(DiagnosticView::from).collect(),
            resolved: assembly.resolved,
        };
        match serde_wasm_bindgen::to_value(&view) {
            Ok(val) => val,
            Err(e) => {
                log::warn(&format!("Failed to serialize assembly: {:?}", e));
                JsValue::NULL
            }
        }
    }

    /// The resolved rotation as SCALE-encoded bytes for the simulation worker
    #[wasm_bindgen]
    pub fn get_resolved_scale(&self) -> Vec<u8> {
        assemble(&self.rotation).resolved.encode()
    }

    #[wasm_bindgen]
    pub fn select(&self) -> JsValue {
        let default = self.class_default.clone();
        let provider = move || default.clone();
        let provider: &dyn AutoRotationProvider = &provider;
        let selected = select_rotation(&self.rotation, assemble(&self.rotation), Some(provider));
        serde_wasm_bindgen::to_value(&SelectionView::from(selected)).unwrap_or(JsValue::NULL)
    }

    /// True if the edited rotation matches a saved preset (JSON string)
    #[wasm_bindgen]
    pub fn matches_preset(&self, preset_json: &str) -> Result<bool, String> {
        let preset = Rotation::from_json(preset_json).map_err(|e| format!("{}", e))?;
        Ok(is_equal_rotation(&self.rotation, &preset))
    }

    /// Placeholder names a reference to `group_name` must supply
    #[wasm_bindgen]
    pub fn group_placeholders(&self, group_name: &str) -> JsValue {
        let names = self
            .rotation
            .group(group_name)
            .map(|g| g.placeholder_names())
            .unwrap_or_default();
        serde_wasm_bindgen::to_value(&names).unwrap_or(JsValue::NULL)
    }

    /// Bring the override list of the group reference at `index` in the
    /// priority list in line with the group's placeholders
    #[wasm_bindgen]
    pub fn sync_group_reference(&mut self, index: usize) -> Result<(), String> {
        let name = self
            .rotation
            .priority_list
            .get(index)
            .and_then(|item| item.action.as_ref())
            .and_then(|action| action.group_reference())
            .map(|reference| reference.group_name.clone())
            .ok_or_else(|| format!("Item {} is not a group reference", index))?;
        let group = self
            .rotation
            .group(&name)
            .cloned()
            .ok_or_else(|| format!("Group '{}' not found", name))?;
        let item = &mut self.rotation.priority_list[index];
        if let Some(ActionKind::GroupReference(reference)) =
            item.action.as_mut().and_then(|a| a.action.as_mut())
        {
            reference.sync_overrides(&group);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apl_core::{APLAction, APLValue, Group};

    #[test]
    fn test_selection_view_sources() {
        let view = SelectionView::from(SelectedRotation::Empty);
        assert_eq!(view.source, "empty");
        assert!(view.resolved.is_none());

        let view = SelectionView::from(SelectedRotation::Authored(ResolvedRotation::default()));
        assert_eq!(view.source, "authored");
        assert!(view.resolved.is_some());
    }

    #[test]
    fn test_sync_group_reference_adds_placeholders() {
        let mut editor = RotationEditor::new();
        editor.rotation = Rotation::apl(vec![APLAction::group_ref("aoe")]).with_group(Group::new(
            "aoe",
            vec![APLAction::cast_spell(1).with_condition(APLValue::placeholder("targets"))],
        ));

        editor.sync_group_reference(0).unwrap();

        let reference = editor.rotation.priority_list[0]
            .action
            .as_ref()
            .and_then(|a| a.group_reference())
            .unwrap();
        assert_eq!(reference.variables.len(), 1);
        assert_eq!(reference.variables[0].name, "targets");
        assert!(editor.sync_group_reference(5).is_err());
    }

    #[test]
    fn test_load_scale_round_trip() {
        let rotation = Rotation::apl(vec![APLAction::cast_spell(7)]);
        let mut editor = RotationEditor::new();

        editor.load_scale(&rotation.encode()).unwrap();

        assert_eq!(editor.rotation, rotation);
        assert!(editor.load_scale(&[0xff]).is_err());
    }

    #[test]
    fn test_diagnostic_view_carries_message() {
        let rotation = Rotation::apl(vec![APLAction::group_ref("missing")]);
        let assembly = assemble(&rotation);
        let view = DiagnosticView::from(&assembly.diagnostics[0]);

        assert_eq!(view.severity, Severity::Error);
        assert!(view.message.contains("missing"));
    }
}
