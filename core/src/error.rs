//! Error and diagnostic types
//!
//! `AplError` covers operations that genuinely fail (decoding a rotation).
//! Everything found while assembling a rotation is a recoverable
//! [`Diagnostic`]: assembly always produces a best-effort result.

use alloc::string::String;
use core::fmt;
use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::types::Uuid;

/// Errors that abort an operation
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AplError {
    /// Rotation JSON could not be parsed
    InvalidJson { message: String },
    /// SCALE bytes could not be decoded
    InvalidEncoding { message: String },
}

impl fmt::Display for AplError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AplError::InvalidJson { message } => write!(f, "invalid rotation JSON: {}", message),
            AplError::InvalidEncoding { message } => {
                write!(f, "invalid rotation encoding: {}", message)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AplError {}

/// Result type alias for rotation operations
pub type AplResult<T> = Result<T, AplError>;

/// How bad a diagnostic is.
///
/// `Error` diagnostics disqualify a rotation from execution when a class
/// default is available; `Warning` diagnostics never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// Which kind of table a duplicated name was found in
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DefinitionKind {
    Group,
    ValueVariable,
    GroupVariable { group: String },
}

/// Why an expansion budget was exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitReason {
    GroupDepth,
    ExpandedActions,
    CopiedNodes,
}

impl fmt::Display for LimitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitReason::GroupDepth => write!(f, "group nesting too deep"),
            LimitReason::ExpandedActions => write!(f, "too many expanded actions"),
            LimitReason::CopiedNodes => write!(f, "too many substituted value nodes"),
        }
    }
}

/// Everything the assembler can report
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// A variable reference or placeholder with no binding in scope
    UnresolvedVariable { name: String },
    /// A group reference naming a group that does not exist
    UnresolvedGroup { name: String },
    /// A variable whose value (transitively) references itself
    CyclicVariableReference { name: String },
    /// A group that (transitively) references itself
    CyclicGroupReference { name: String },
    /// A name defined more than once in the same table; the last one wins
    DuplicateDefinition { kind: DefinitionKind, name: String },
    /// A group reference inside a sequence or schedule, which cannot be spliced
    NestedGroupReference { name: String },
    /// An expansion budget was exhausted
    LimitExceeded { reason: LimitReason },
    /// A prepull `doAtValue` that is not a constant, non-positive duration
    InvalidPrepullTime { value: String },
    /// A malformed unit reference
    InvalidUnitReference { reason: String },
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::UnresolvedVariable { .. }
            | DiagnosticKind::UnresolvedGroup { .. }
            | DiagnosticKind::CyclicVariableReference { .. }
            | DiagnosticKind::CyclicGroupReference { .. }
            | DiagnosticKind::NestedGroupReference { .. }
            | DiagnosticKind::LimitExceeded { .. } => Severity::Error,
            DiagnosticKind::DuplicateDefinition { .. }
            | DiagnosticKind::InvalidPrepullTime { .. }
            | DiagnosticKind::InvalidUnitReference { .. } => Severity::Warning,
        }
    }

    pub fn is_hard(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnresolvedVariable { name } => {
                write!(f, "Value variable '{}' not found", name)
            }
            DiagnosticKind::UnresolvedGroup { name } => {
                write!(f, "Group reference '{}' not found", name)
            }
            DiagnosticKind::CyclicVariableReference { name } => {
                write!(f, "Value variable '{}' references itself", name)
            }
            DiagnosticKind::CyclicGroupReference { name } => {
                write!(f, "Group '{}' references itself", name)
            }
            DiagnosticKind::DuplicateDefinition { kind, name } => match kind {
                DefinitionKind::Group => write!(f, "Group '{}' is defined more than once", name),
                DefinitionKind::ValueVariable => {
                    write!(f, "Value variable '{}' is defined more than once", name)
                }
                DefinitionKind::GroupVariable { group } => write!(
                    f,
                    "Variable '{}' is defined more than once in group '{}'",
                    name, group
                ),
            },
            DiagnosticKind::NestedGroupReference { name } => write!(
                f,
                "Group reference '{}' cannot be used inside a sequence or schedule",
                name
            ),
            DiagnosticKind::LimitExceeded { reason } => write!(f, "Expansion stopped: {}", reason),
            DiagnosticKind::InvalidPrepullTime { value } => write!(
                f,
                "Invalid time '{}' for 'Do At', ignoring this Prepull Action",
                value
            ),
            DiagnosticKind::InvalidUnitReference { reason } => {
                write!(f, "Invalid unit reference: {}", reason)
            }
        }
    }
}

/// Top-level position a diagnostic was raised under
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Site {
    Rotation,
    PriorityList { index: u32 },
    Prepull { index: u32 },
    ValueVariable { name: String },
    Group { name: String },
}

/// A recoverable validation finding
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub site: Site,
    /// Identity of the offending value node, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_hard(&self) -> bool {
        self.kind.is_hard()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.site {
            Site::Rotation => write!(f, "{}", self.kind),
            Site::PriorityList { index } => write!(f, "priority list #{}: {}", index, self.kind),
            Site::Prepull { index } => write!(f, "prepull #{}: {}", index, self.kind),
            Site::ValueVariable { name } => write!(f, "variable '{}': {}", name, self.kind),
            Site::Group { name } => write!(f, "group '{}': {}", name, self.kind),
        }
    }
}
