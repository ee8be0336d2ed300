#![cfg_attr(not(feature = "std"), no_std)]

//! Action priority list rotations
//!
//! The authored [`Rotation`] document, its assembly into a closed
//! [`ResolvedRotation`] (variables substituted, groups spliced, prepull
//! ordered), the equality oracle used to match presets, and the selection of
//! what the simulation actually runs.

extern crate alloc;

pub mod actions;
pub mod assemble;
pub mod constant;
pub mod equality;
pub mod error;
pub mod fallback;
pub mod ids;
pub mod limits;
pub mod log;
pub mod types;
pub mod values;

mod expand;
mod resolve;

#[cfg(test)]
mod tests;

pub use actions::*;
pub use assemble::{
    assemble, assemble_with, ActionList, Assembly, AssemblyStage, ResolvedPrepullAction,
    ResolvedRotation,
};
pub use constant::ConstValue;
pub use equality::is_equal_rotation;
pub use error::*;
pub use fallback::{select_rotation, AutoRotationProvider, SelectedRotation};
pub use limits::ResolveConfig;
pub use types::*;
pub use values::*;
