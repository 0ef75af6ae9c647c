//! Provider and facade capability traits
//!
//! A driver implementation exposes exactly four things: the kind it serves,
//! a specificity ordinal, a connection-string pattern, and an open-facade
//! operation. The registry ranks and dispatches on nothing else.

use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;
use crate::types::{ConnectProps, RdbmsKind, Specificity};

/// A driver implementation capable of opening facades against one RDBMS
/// family.
///
/// Several providers may claim the same kind; the registry keeps only the
/// most specific one visible per kind. Identity matters: deregistration
/// matches the exact registered instance, so two instances reporting
/// identical values stay distinguishable.
#[async_trait]
pub trait RdbmsProvider: Send + Sync {
    /// The database family this provider serves.
    fn rdbms(&self) -> RdbmsKind;

    /// Preference ordinal; lower beats higher for the same kind.
    fn specificity(&self) -> Specificity;

    /// Pattern a connection string must match, in full, for this provider
    /// to service it.
    fn connection_pattern(&self) -> &Regex;

    /// Open a facade for the given connection string.
    ///
    /// `properties` and `connections_limit` are forwarded to the underlying
    /// driver untouched. Failure causes are the provider's own (network,
    /// credentials, driver defects); callers receive them unwrapped.
    async fn open_facade(
        &self,
        connection_string: &str,
        properties: Option<&ConnectProps>,
        connections_limit: u32,
    ) -> Result<Box<dyn Facade>>;
}

/// An open connection abstraction returned by a provider.
///
/// Internals are provider-specific; the registry only hands facades
/// through.
#[async_trait]
pub trait Facade: Send + Sync {
    /// The database family this facade talks to.
    fn rdbms(&self) -> RdbmsKind;

    /// The connection cap the facade was opened with.
    fn connections_limit(&self) -> u32;

    /// Tear down the facade and any underlying connections.
    async fn disconnect(&self) -> Result<()>;
}
