//! Variable resolution
//!
//! Rotation-level variables form the outermost scope. Every group invocation
//! pushes a [`Frame`] holding the group's own variables with the reference's
//! overrides layered on top; frames of outer invocations stay visible, so a
//! name is looked up from the innermost frame outwards and then in the
//! rotation table. Placeholders are only looked up in the innermost frame.
//!
//! Bound values are resolved once per scope and cached. Every use site gets
//! its own copy with fresh uuids.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::actions::{APLAction, ActionKind};
use crate::error::{DefinitionKind, Diagnostic, DiagnosticKind, Site};
use crate::ids::IdMinter;
use crate::limits::{InProgress, ResolveConfig, ResolveLimits};
use crate::log;
use crate::types::{APLValueVariable, Group, UnitReference, Uuid};
use crate::values::{APLValue, ValueConst, ValueKind};

/// What a name is bound to inside a group frame
pub(crate) enum Binding<'a> {
    /// The group's own variable, resolved in the frame's scope on first use
    Declared(&'a APLValue),
    /// An override from the invoking reference, already resolved in the caller's scope
    Override(APLValue),
    /// Declared without a value
    Empty,
}

/// Scope of one group invocation
pub(crate) struct Frame<'a> {
    serial: u32,
    bindings: BTreeMap<String, Binding<'a>>,
    resolved: BTreeMap<String, APLValue>,
}

#[derive(PartialEq)]
struct VarKey {
    scope: u32,
    name: String,
}

enum Lookup {
    Found(APLValue),
    Missing,
    Cyclic,
}

/// The value left where a reference could not be resolved
pub(crate) fn inert(uuid: Option<Uuid>) -> APLValue {
    APLValue {
        uuid,
        value: Some(ValueKind::Const(ValueConst { val: String::new() })),
    }
}

pub(crate) struct Resolver<'a> {
    pub groups: BTreeMap<&'a str, &'a Group>,
    rotation_vars: BTreeMap<&'a str, Option<&'a APLValue>>,
    rotation_resolved: BTreeMap<String, APLValue>,
    frames: Vec<Frame<'a>>,
    next_serial: u32,
    var_stack: InProgress<VarKey>,
    pub group_stack: InProgress<String>,
    pub limits: ResolveLimits,
    ids: IdMinter,
    pub diagnostics: Vec<Diagnostic>,
    pub site: Site,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &ResolveConfig) -> Self {
        Self {
            groups: BTreeMap::new(),
            rotation_vars: BTreeMap::new(),
            rotation_resolved: BTreeMap::new(),
            frames: Vec::new(),
            next_serial: 1,
            var_stack: InProgress::new(),
            group_stack: InProgress::new(),
            limits: ResolveLimits::new(config),
            ids: IdMinter::new(config.id_seed),
            diagnostics: Vec::new(),
            site: Site::Rotation,
        }
    }

    /// Record a diagnostic at the current site. Identical findings are kept once.
    pub fn report(&mut self, kind: DiagnosticKind, uuid: Option<Uuid>) {
        let diagnostic = Diagnostic {
            kind,
            site: self.site.clone(),
            uuid,
        };
        if !self.diagnostics.contains(&diagnostic) {
            log::debug("diagnostic", &format!("{}", diagnostic));
            self.diagnostics.push(diagnostic);
        }
    }

    // ==========================================
    // TABLES
    // ==========================================

    /// Build the group table. Later definitions replace earlier ones.
    pub fn declare_groups(&mut self, groups: &'a [Group]) {
        for group in groups {
            self.site = Site::Group {
                name: group.name.clone(),
            };
            if self.groups.insert(group.name.as_str(), group).is_some() {
                self.report(
                    DiagnosticKind::DuplicateDefinition {
                        kind: DefinitionKind::Group,
                        name: group.name.clone(),
                    },
                    None,
                );
            }
            let mut seen: Vec<&str> = Vec::new();
            for variable in &group.variables {
                if seen.contains(&variable.name.as_str()) {
                    self.report(
                        DiagnosticKind::DuplicateDefinition {
                            kind: DefinitionKind::GroupVariable {
                                group: group.name.clone(),
                            },
                            name: variable.name.clone(),
                        },
                        None,
                    );
                } else {
                    seen.push(&variable.name);
                }
            }
        }
        self.site = Site::Rotation;
    }

    /// Build the rotation-level variable table. Later definitions replace earlier ones.
    pub fn declare_variables(&mut self, variables: &'a [APLValueVariable]) {
        for variable in variables {
            self.site = Site::ValueVariable {
                name: variable.name.clone(),
            };
            let value = variable.value.as_ref().filter(|v| v.value.is_some());
            if self.rotation_vars.insert(variable.name.as_str(), value).is_some() {
                self.report(
                    DiagnosticKind::DuplicateDefinition {
                        kind: DefinitionKind::ValueVariable,
                        name: variable.name.clone(),
                    },
                    None,
                );
            }
        }
        self.site = Site::Rotation;
    }

    /// Resolve every rotation-level variable, so findings inside variable
    /// bodies are reported once and under the variable's own site.
    pub fn resolve_rotation_variables(&mut self) {
        let names: Vec<&'a str> = self.rotation_vars.keys().copied().collect();
        for name in names {
            self.site = Site::ValueVariable { name: name.into() };
            // Cycles are reported at the reference that closes them
            let _ = self.resolve_rotation_variable(name);
        }
        self.site = Site::Rotation;
    }

    fn resolve_rotation_variable(&mut self, name: &str) -> Lookup {
        if let Some(resolved) = self.rotation_resolved.get(name) {
            return Lookup::Found(resolved.clone());
        }
        let declared = match self.rotation_vars.get(name) {
            Some(Some(value)) => *value,
            _ => return Lookup::Missing,
        };
        let key = VarKey {
            scope: 0,
            name: name.into(),
        };
        if !self.var_stack.enter(key) {
            return Lookup::Cyclic;
        }
        let resolved = self.resolve_value(declared, 0);
        self.var_stack.exit();
        self.rotation_resolved.insert(name.into(), resolved.clone());
        Lookup::Found(resolved)
    }

    // ==========================================
    // FRAMES
    // ==========================================

    /// Open the scope of a group invocation. `overrides` must already be
    /// resolved in the caller's scope.
    pub fn push_frame(&mut self, group: &'a Group, overrides: &[APLValueVariable]) {
        let mut bindings = BTreeMap::new();
        for variable in &group.variables {
            let binding = match variable.value.as_ref().filter(|v| v.value.is_some()) {
                Some(value) => Binding::Declared(value),
                None => Binding::Empty,
            };
            bindings.insert(variable.name.clone(), binding);
        }
        for variable in overrides {
            if let Some(value) = &variable.value {
                bindings.insert(variable.name.clone(), Binding::Override(value.clone()));
            }
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.frames.push(Frame {
            serial,
            bindings,
            resolved: BTreeMap::new(),
        });
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Number of frames visible to code resolved right now
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn resolve_in_frame(&mut self, index: usize, name: &str) -> Lookup {
        if let Some(resolved) = self.frames[index].resolved.get(name) {
            return Lookup::Found(resolved.clone());
        }
        let declared = match self.frames[index].bindings.get(name) {
            Some(Binding::Declared(value)) => *value,
            Some(Binding::Override(value)) => return Lookup::Found(value.clone()),
            Some(Binding::Empty) | None => return Lookup::Missing,
        };
        let key = VarKey {
            scope: self.frames[index].serial,
            name: name.into(),
        };
        if !self.var_stack.enter(key) {
            return Lookup::Cyclic;
        }
        let resolved = self.resolve_value(declared, index + 1);
        self.var_stack.exit();
        self.frames[index]
            .resolved
            .insert(name.into(), resolved.clone());
        Lookup::Found(resolved)
    }

    fn lookup(&mut self, name: &str, depth: usize, placeholder: bool) -> Lookup {
        if name.is_empty() {
            return Lookup::Missing;
        }
        if placeholder {
            return match depth.checked_sub(1) {
                Some(index) if self.frames[index].bindings.contains_key(name) => {
                    self.resolve_in_frame(index, name)
                }
                _ => Lookup::Missing,
            };
        }
        for index in (0..depth).rev() {
            if self.frames[index].bindings.contains_key(name) {
                return self.resolve_in_frame(index, name);
            }
        }
        self.resolve_rotation_variable(name)
    }

    // ==========================================
    // VALUES
    // ==========================================

    fn substitute(
        &mut self,
        name: &str,
        placeholder: bool,
        node: &APLValue,
        depth: usize,
    ) -> APLValue {
        match self.lookup(name, depth, placeholder) {
            Lookup::Found(bound) => self.fresh_copy(&bound),
            Lookup::Missing => {
                self.report(
                    DiagnosticKind::UnresolvedVariable { name: name.into() },
                    node.uuid.clone(),
                );
                inert(node.uuid.clone())
            }
            Lookup::Cyclic => {
                self.report(
                    DiagnosticKind::CyclicVariableReference { name: name.into() },
                    node.uuid.clone(),
                );
                inert(node.uuid.clone())
            }
        }
    }

    pub fn mint_uuid(&mut self) -> Uuid {
        self.ids.next_uuid()
    }

    /// Deep copy with fresh uuids on every node
    pub fn fresh_copy(&mut self, value: &APLValue) -> APLValue {
        if let Err(reason) = self.limits.record_copy(value.node_count() as u32) {
            self.report(DiagnosticKind::LimitExceeded { reason }, None);
            return inert(None);
        }
        let mut copy = value.clone();
        let ids = &mut self.ids;
        copy.walk_mut(&mut |node| node.uuid = Some(ids.next_uuid()));
        copy
    }

    fn check_units(&mut self, units: Vec<&UnitReference>, uuid: Option<&Uuid>) {
        for unit in units {
            if let Some(reason) = unit.validate() {
                self.report(
                    DiagnosticKind::InvalidUnitReference {
                        reason: reason.into(),
                    },
                    uuid.cloned(),
                );
            }
        }
    }

    /// Resolve `value` with the innermost `depth` frames visible
    pub fn resolve_value(&mut self, value: &APLValue, depth: usize) -> APLValue {
        let kind = match &value.value {
            Some(kind) => kind,
            None => return value.clone(),
        };
        match kind {
            ValueKind::VariableRef(v) => self.substitute(&v.name, false, value, depth),
            ValueKind::VariablePlaceholder(v) => self.substitute(&v.name, true, value, depth),
            _ => {
                self.check_units(kind.unit_refs(), value.uuid.as_ref());
                let mut resolved = kind.clone();
                for child in resolved.children_mut() {
                    let replacement = self.resolve_value(child, depth);
                    *child = replacement;
                }
                APLValue {
                    uuid: value.uuid.clone(),
                    value: Some(resolved),
                }
            }
        }
    }

    /// Resolve an optional value slot. A slot holding a value with no kind is dropped.
    pub fn resolve_optional(&mut self, value: &Option<APLValue>, depth: usize) -> Option<APLValue> {
        let value = value.as_ref().filter(|v| v.value.is_some())?;
        Some(self.resolve_value(value, depth))
    }

    // ==========================================
    // ACTIONS
    // ==========================================

    /// Resolve every value in an action. Group references keep their shape
    /// with override values resolved in the current scope; splicing happens
    /// during expansion. Returns `None` for an action with no payload.
    pub fn resolve_action(&mut self, action: &APLAction, depth: usize) -> Option<APLAction> {
        let mut kind = action.action.clone()?;
        let condition = self.resolve_optional(&action.condition, depth);
        self.check_units(kind.unit_refs(), None);
        match &mut kind {
            ActionKind::ChannelSpell(c) => {
                c.interrupt_if = self.resolve_optional(&c.interrupt_if, depth)
            }
            ActionKind::Multidot(m) => m.max_overlap = self.resolve_optional(&m.max_overlap, depth),
            ActionKind::Wait(w) => w.duration = self.resolve_optional(&w.duration, depth),
            ActionKind::WaitUntil(w) => w.condition = self.resolve_optional(&w.condition, depth),
            ActionKind::Move(m) => {
                m.range_from_target = self.resolve_optional(&m.range_from_target, depth)
            }
            ActionKind::Schedule(s) => {
                s.inner_action = match s.inner_action.take() {
                    Some(inner) => self.resolve_action(&inner, depth).map(alloc::boxed::Box::new),
                    None => None,
                }
            }
            ActionKind::Sequence(s) => s.actions = self.resolve_actions(&s.actions, depth),
            ActionKind::StrictSequence(s) => s.actions = self.resolve_actions(&s.actions, depth),
            ActionKind::GroupReference(r) => {
                for variable in &mut r.variables {
                    variable.value = self.resolve_optional(&variable.value, depth);
                }
            }
            _ => {}
        }
        Some(APLAction {
            condition,
            action: Some(kind),
        })
    }

    fn resolve_actions(&mut self, actions: &[APLAction], depth: usize) -> Vec<APLAction> {
        actions
            .iter()
            .filter_map(|a| self.resolve_action(a, depth))
            .collect()
    }
}
