//! Change detection over normalized resolution results
//!
//! Results are kept sorted and deduplicated so two lookups compare equal
//! regardless of the order the DNS response listed the records in.

use crate::domain::QueryType;
use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

/// Text rendered for an empty result
pub const NOT_FOUND: &str = "not found";

/// Normalized, order-independent result of one lookup
///
/// An empty result means "no records or lookup failed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResolutionResult(Vec<String>);

impl ResolutionResult {
    /// The empty result
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Normalize raw lookup output for `query_type`
    ///
    /// - `A`: values that parse as IP addresses are re-rendered canonically
    /// - `CNAME`: at most one target is kept
    /// - `MX`, `TXT`, `NS`: values are kept verbatim
    pub fn normalize(query_type: QueryType, raw: Vec<String>) -> Self {
        match query_type {
            QueryType::A => raw
                .into_iter()
                .map(|value| match value.parse::<IpAddr>() {
                    Ok(ip) => ip.to_string(),
                    Err(_) => value,
                })
                .collect(),
            QueryType::Cname => raw.into_iter().take(1).collect(),
            QueryType::Mx | QueryType::Txt | QueryType::Ns => raw.into_iter().collect(),
        }
    }

    /// Sorted values
    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No records
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for ResolutionResult {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let set: BTreeSet<String> = iter.into_iter().collect();
        Self(set.into_iter().collect())
    }
}

impl From<Vec<String>> for ResolutionResult {
    fn from(values: Vec<String>) -> Self {
        values.into_iter().collect()
    }
}

impl fmt::Display for ResolutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str(NOT_FOUND)
        } else {
            f.write_str(&self.0.join(", "))
        }
    }
}

/// Outcome of comparing a fresh result against the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Nothing was stored yet
    FirstObservation,
    /// Same values as last time
    Unchanged,
    /// Values differ from last time
    Changed,
}

/// Classify `current` against `previous` (`None` = never resolved)
///
/// Comparison is exact, element by element.
pub fn classify(previous: Option<&ResolutionResult>, current: &ResolutionResult) -> Observation {
    match previous {
        None => Observation::FirstObservation,
        Some(previous) if previous == current => Observation::Unchanged,
        Some(_) => Observation::Changed,
    }
}
