use crate::catalog::TypeIdentity;
use derive_more::Display;
use itertools::Itertools;
use thiserror::Error;

/// Category reported for problems with the resolved services.
pub const SERVICES_CATEGORY: &str = "DI.Services";

/// Category reported for problems with the generator itself.
pub const GENERATOR_CATEGORY: &str = "wiregen";

fn format_chain(chain: &[TypeIdentity]) -> String {
    chain.iter().join(" -> ")
}

/// Errors which abort a generation pass. A pass never produces partial output - the caller sees
/// either complete source text or exactly one of these.
#[derive(Error, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GenerationError {
    #[error("Could not find an implementation of type '{0}'.")]
    UnresolvedType(TypeIdentity),
    #[error("Can not find field with name '{identifier}' for service '{required_by}' constructor.")]
    MissingField {
        identifier: String,
        required_by: TypeIdentity,
    },
    #[error("Dependency cycle detected: {}.", format_chain(.chain))]
    DependencyCycle { chain: Vec<TypeIdentity> },
    #[error("Could not find '{0}' after adding it to the catalog.")]
    MissingScaffolding(TypeIdentity),
    #[error("Attempted to register a duplicated type: {0}")]
    DuplicateType(TypeIdentity),
}

impl GenerationError {
    /// Stable short code of the error.
    pub fn id(&self) -> &'static str {
        match self {
            Self::UnresolvedType(_) => "DIGEN001",
            Self::MissingField { .. } => "DIGEN002",
            Self::DependencyCycle { .. } => "DIGEN003",
            Self::MissingScaffolding(_) => "INTER001",
            Self::DuplicateType(_) => "INTER002",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::UnresolvedType(_) | Self::MissingScaffolding(_) => "Type not found",
            Self::MissingField { .. } => "Field not found",
            Self::DependencyCycle { .. } => "Dependency cycle",
            Self::DuplicateType(_) => "Duplicate type",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::UnresolvedType(_) | Self::MissingField { .. } | Self::DependencyCycle { .. } => {
                SERVICES_CATEGORY
            }
            Self::MissingScaffolding(_) | Self::DuplicateType(_) => GENERATOR_CATEGORY,
        }
    }

    /// Converts the error into a structured [Diagnostic] for the host's reporting mechanism.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            id: self.id(),
            title: self.title(),
            message: self.to_string(),
            category: self.category(),
            severity: Severity::Error,
        }
    }
}

/// Severity reported to the host. Every generation error aborts the pass.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash)]
pub enum Severity {
    #[display(fmt = "error")]
    Error,
}

/// Structured report handed over to the host instead of propagating errors across the boundary.
#[derive(Clone, Debug, Display, Eq, PartialEq, Hash)]
#[display(fmt = "{} {}: {} [{}]", severity, id, message, category)]
pub struct Diagnostic {
    pub id: &'static str,
    pub title: &'static str,
    pub message: String,
    pub category: &'static str,
    pub severity: Severity,
}
