//! Core identifier types shared across the registry
//!
//! - `RdbmsKind`: opaque identifier for a family of database systems
//! - `Specificity`: provider preference ordinal (lower = more specific)
//! - `ConnectProps`: opaque connection properties passed through to drivers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Connection properties forwarded to providers untouched.
pub type ConnectProps = HashMap<String, String>;

/// Identifier for a family of database systems (e.g. the Postgres family,
/// the Oracle family).
///
/// Kinds are equality-comparable and cheap to clone; providers claiming the
/// same kind compete on [`Specificity`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RdbmsKind(Arc<str>);

impl RdbmsKind {
    /// Create a kind from its code, e.g. `RdbmsKind::of("POSTGRES")`.
    pub fn of(code: impl AsRef<str>) -> Self {
        Self(Arc::from(code.as_ref()))
    }

    /// The kind's code string.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl From<String> for RdbmsKind {
    fn from(code: String) -> Self {
        Self(Arc::from(code.as_str()))
    }
}

impl From<RdbmsKind> for String {
    fn from(kind: RdbmsKind) -> Self {
        kind.0.to_string()
    }
}

impl fmt::Display for RdbmsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RdbmsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RdbmsKind({})", self.0)
    }
}

/// Provider preference ordinal. Lower values are more specific and win
/// ranking; providers self-report it and duplicates are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Specificity(pub u8);

impl Specificity {
    /// The strongest possible claim on a kind.
    pub const MOST_SPECIFIC: Specificity = Specificity(0);

    /// The weakest possible claim, for catch-all providers.
    pub const LEAST_SPECIFIC: Specificity = Specificity(u8::MAX);
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
