// # Resolver Trait
//
// Defines the interface for issuing one DNS query.
//
// ## Implementations
//
// - hickory: `dnsmonitor-resolver-hickory` crate (system or custom nameserver)
//
// Implementations return raw record text and report failures as errors.
// [`resolve`] is the adapter the monitor calls: it folds every failure into
// the empty result and normalizes the rest.

use crate::detector::ResolutionResult;
use crate::domain::QueryType;
use async_trait::async_trait;
use tracing::debug;

/// Trait for DNS resolver implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Caching
///
/// Implementations must not add a cache of their own. Each monitor cycle
/// expects a fresh query.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Query `name` for records of `query_type`
    ///
    /// # Returns
    ///
    /// - `Ok(values)`: The record values as text, in any order
    /// - `Err(Error)`: NXDOMAIN, timeout, SERVFAIL, network failure, ...
    async fn lookup(
        &self,
        query_type: QueryType,
        name: &str,
    ) -> Result<Vec<String>, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &str;
}

/// Resolve `name` and normalize the answer
///
/// Any resolver error becomes the empty result, so a failed query and a
/// name with no records look the same to the change detector.
pub async fn resolve(
    resolver: &dyn Resolver,
    query_type: QueryType,
    name: &str,
) -> ResolutionResult {
    match resolver.lookup(query_type, name).await {
        Ok(raw) => ResolutionResult::normalize(query_type, raw),
        Err(e) => {
            debug!(
                resolver = resolver.resolver_name(),
                "[{}] {} lookup failed: {}", query_type, name, e
            );
            ResolutionResult::empty()
        }
    }
}
