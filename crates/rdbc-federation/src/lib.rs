//! # rdbc-federation
//!
//! Federated provider registry for relational database connectivity.
//!
//! Multiple driver implementations ("providers") may claim support for the
//! same RDBMS family with varying degrees of specialization. This crate
//! keeps them ranked, exposes the most specific provider per family, and
//! resolves connection strings to the best matching provider across
//! families.
//!
//! ## Features
//!
//! - **Specificity ranking**: lower ordinal wins; the first registration
//!   wins ties
//! - **Read-optimized lookups**: resolution scans one cached entry per
//!   family, not the full provider list
//! - **Live registration**: providers come and go at runtime, safely under
//!   concurrent lookups
//! - **Pluggable discovery**: provider loading is an injected strategy, not
//!   a built-in scan
//! - **Pass-through data source**: thin factory binding one native driver
//!   to one connection string
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rdbc_federation::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = FederatedRegistry::new();
//! registry.register(Arc::new(PgProvider::default()));
//!
//! let facade = registry
//!     .open_facade("jdbc:postgresql://localhost/db", None, 10)
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod datasource;
pub mod discovery;
pub mod error;
pub mod provider;
pub mod registry;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::datasource::{NativeConnection, NativeDriver, SimpleDataSource};
    pub use crate::discovery::{ProviderLoader, StaticProviderLoader};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::provider::{Facade, RdbmsProvider};
    pub use crate::registry::FederatedRegistry;
    pub use crate::types::{ConnectProps, RdbmsKind, Specificity};
}

// Re-export commonly used items at crate root
pub use error::{Error, Result};
pub use registry::FederatedRegistry;
