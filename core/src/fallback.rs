//! Choosing what the simulation actually runs
//!
//! An `Auto` rotation runs the class default. An authored rotation with hard
//! errors is never handed to the engine: the class default replaces it, or
//! nothing runs when there is no default.

use crate::assemble::{assemble, Assembly, ResolvedRotation};
use crate::log;
use crate::types::{Rotation, RotationType, SimpleRotation};

/// Source of the per-class default rotation
pub trait AutoRotationProvider {
    fn auto_rotation(&self) -> Option<Rotation>;
}

impl<F> AutoRotationProvider for F
where
    F: Fn() -> Option<Rotation>,
{
    fn auto_rotation(&self) -> Option<Rotation> {
        self()
    }
}

/// What the simulation should execute
#[derive(Debug, Clone, PartialEq)]
pub enum SelectedRotation {
    /// The user's rotation, assembled without hard errors
    Authored(ResolvedRotation),
    /// The class default, standing in for the user's rotation
    Fallback(ResolvedRotation),
    /// Specialization options; the engine runs its built-in rotation with them
    Simple(SimpleRotation),
    /// Nothing runnable
    Empty,
}

impl SelectedRotation {
    pub fn resolved(&self) -> Option<&ResolvedRotation> {
        match self {
            SelectedRotation::Authored(r) | SelectedRotation::Fallback(r) => Some(r),
            _ => None,
        }
    }
}

fn class_default(provider: Option<&dyn AutoRotationProvider>) -> Option<ResolvedRotation> {
    let rotation = provider?.auto_rotation()?;
    let assembly = assemble(&rotation);
    if assembly.has_hard_errors() {
        log::warn("class default rotation has errors, ignoring it");
        return None;
    }
    Some(assembly.resolved)
}

/// Pick the rotation to execute given the user's `rotation` and its `assembly`
pub fn select_rotation(
    rotation: &Rotation,
    assembly: Assembly,
    provider: Option<&dyn AutoRotationProvider>,
) -> SelectedRotation {
    match rotation.rotation_type {
        RotationType::Simple => {
            SelectedRotation::Simple(rotation.simple.clone().unwrap_or_default())
        }
        RotationType::Auto => match class_default(provider) {
            Some(default) => SelectedRotation::Fallback(default),
            None if assembly.has_hard_errors() => SelectedRotation::Empty,
            None => SelectedRotation::Authored(assembly.resolved),
        },
        RotationType::Apl | RotationType::Unknown => {
            if !assembly.has_hard_errors() {
                return SelectedRotation::Authored(assembly.resolved);
            }
            log::warn("rotation has hard errors, substituting the class default");
            match class_default(provider) {
                Some(default) => SelectedRotation::Fallback(default),
                None => SelectedRotation::Empty,
            }
        }
    }
}
