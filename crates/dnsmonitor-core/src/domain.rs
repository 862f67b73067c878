//! Monitored domains and their in-memory state
//!
//! A [`MonitoredDomain`] is built once at startup from a target token
//! (`www.example.com`, `mx:example.com`, ...). Its name and query type never
//! change afterwards; only the monitor loop updates `last_result`.

use crate::detector::ResolutionResult;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum length of a monitored name
const MIN_NAME_LEN: usize = 4;

/// DNS query kinds the monitor can watch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// IPv4 and IPv6 addresses
    #[default]
    A,
    /// Canonical name target
    Cname,
    /// Mail exchange hosts
    Mx,
    /// Text records
    Txt,
    /// Authoritative nameservers
    Ns,
}

impl QueryType {
    /// All supported query types
    pub const ALL: [QueryType; 5] = [
        QueryType::A,
        QueryType::Cname,
        QueryType::Mx,
        QueryType::Txt,
        QueryType::Ns,
    ];

    /// Upper-case mnemonic used in logs and notification titles
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::A => "A",
            QueryType::Cname => "CNAME",
            QueryType::Mx => "MX",
            QueryType::Txt => "TXT",
            QueryType::Ns => "NS",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        QueryType::ALL
            .into_iter()
            .find(|qt| qt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_target(format!("unknown query type '{}'", s)))
    }
}

/// A domain under observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredDomain {
    name: String,
    query_type: QueryType,
    last_result: Option<ResolutionResult>,
    last_checked: Option<DateTime<Utc>>,
}

impl MonitoredDomain {
    /// Create a domain with no observation yet
    ///
    /// The name is lower-cased and validated.
    pub fn new(name: impl Into<String>, query_type: QueryType) -> Result<Self> {
        let name = name.into().to_ascii_lowercase();
        if !is_valid_name(&name) {
            return Err(Error::invalid_target(name));
        }

        Ok(Self {
            name,
            query_type,
            last_result: None,
            last_checked: None,
        })
    }

    /// Parse a target token: `name` (type A) or `type:name`
    ///
    /// The type prefix is case-insensitive and must be one of
    /// `a`, `cname`, `mx`, `txt`, `ns`.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim().to_ascii_lowercase();

        if let Some((prefix, name)) = token.split_once(':')
            && is_valid_name(name)
            && let Ok(query_type) = prefix.parse::<QueryType>()
        {
            return Self::new(name, query_type);
        }

        Self::new(token, QueryType::A)
    }

    /// Normalized (lower-case) name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Query type to resolve
    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Last normalized result, `None` before the first resolution
    pub fn last_result(&self) -> Option<&ResolutionResult> {
        self.last_result.as_ref()
    }

    /// Time the last resolution completed
    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked
    }

    /// Record a completed resolution, returning the previous result
    pub(crate) fn record(&mut self, result: ResolutionResult) -> Option<ResolutionResult> {
        self.last_checked = Some(Utc::now());
        self.last_result.replace(result)
    }
}

impl fmt::Display for MonitoredDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.query_type, self.name)
    }
}

/// Parse an ordered list of target tokens, failing on the first bad one
pub fn parse_targets<I, S>(tokens: I) -> Result<Vec<MonitoredDomain>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let domains = tokens
        .into_iter()
        .map(|token| MonitoredDomain::parse(token.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    if domains.is_empty() {
        return Err(Error::config("No domains to monitor"));
    }

    Ok(domains)
}

/// Permissive hostname check: `[a-z0-9.-]{4,}`
fn is_valid_name(name: &str) -> bool {
    name.len() >= MIN_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_defaults_to_a() {
        let domain = MonitoredDomain::parse("www.example.com").unwrap();
        assert_eq!(domain.name(), "www.example.com");
        assert_eq!(domain.query_type(), QueryType::A);
        assert!(domain.last_result().is_none());
    }

    #[test]
    fn type_prefix_selects_query_type() {
        let domain = MonitoredDomain::parse("mx:example.com").unwrap();
        assert_eq!(domain.name(), "example.com");
        assert_eq!(domain.query_type(), QueryType::Mx);

        let domain = MonitoredDomain::parse("TXT:Example.COM").unwrap();
        assert_eq!(domain.name(), "example.com");
        assert_eq!(domain.query_type(), QueryType::Txt);

        let domain = MonitoredDomain::parse("cname:www.example.com").unwrap();
        assert_eq!(domain.query_type(), QueryType::Cname);

        let domain = MonitoredDomain::parse("ns:example.com").unwrap();
        assert_eq!(domain.query_type(), QueryType::Ns);
    }

    #[test]
    fn short_names_are_rejected() {
        assert!(matches!(
            MonitoredDomain::parse("bad"),
            Err(Error::InvalidTarget(_))
        ));
        assert!(MonitoredDomain::parse("mx:a.b").is_err());
    }

    #[test]
    fn unknown_type_prefix_is_rejected() {
        assert!(MonitoredDomain::parse("aaaa:example.com").is_err());
        assert!(MonitoredDomain::parse("soa:example.com").is_err());
    }

    #[test]
    fn invalid_characters_are_rejected() {
        assert!(MonitoredDomain::parse("exa mple.com").is_err());
        assert!(MonitoredDomain::parse("example_com").is_err());
        assert!(MonitoredDomain::parse("").is_err());
    }

    #[test]
    fn parse_targets_keeps_order() {
        let domains =
            parse_targets(["ns:example.com", "txt:example.com", "www.example.com"]).unwrap();
        let names: Vec<String> = domains.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            names,
            vec!["[NS] example.com", "[TXT] example.com", "[A] www.example.com"]
        );
    }

    #[test]
    fn parse_targets_fails_fast() {
        let err = parse_targets(["example.com", "bad", "other.com"]).unwrap_err();
        assert_eq!(err.to_string(), "Not a valid domain: bad");
    }

    #[test]
    fn parse_targets_rejects_empty_list() {
        let tokens: Vec<&str> = Vec::new();
        assert!(parse_targets(tokens).is_err());
    }

    #[test]
    fn record_returns_previous_result() {
        let mut domain = MonitoredDomain::parse("example.com").unwrap();
        let first = ResolutionResult::from(vec!["1.1.1.1".to_string()]);

        assert!(domain.record(first.clone()).is_none());
        assert!(domain.last_checked().is_some());
        assert_eq!(domain.record(ResolutionResult::empty()), Some(first));
        assert_eq!(domain.last_result(), Some(&ResolutionResult::empty()));
    }
}
