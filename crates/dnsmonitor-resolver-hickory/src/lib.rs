// # Hickory Resolver
//
// This crate provides the DNS resolver used by the monitor, built on
// `hickory-resolver`.
//
// ## Nameservers
//
// - System configuration (`/etc/resolv.conf` or the platform equivalent)
// - A single custom endpoint (host or IP), queried over UDP port 53
//
// ## Query Types
//
// | Type  | Lookup          | Value returned                          |
// |-------|-----------------|-----------------------------------------|
// | A     | `lookup_ip`     | every IPv4 and IPv6 address (both       |
// |       |                 | families queried)                       |
// | CNAME | `lookup_ip`     | end of the CNAME chain, or the name     |
// |       |                 | itself when it has no CNAME             |
// | MX    | `mx_lookup`     | exchange host names (preference dropped)|
// | TXT   | `txt_lookup`    | each record's strings concatenated      |
// | NS    | `ns_lookup`     | nameserver host names                   |
//
// hickory's answer cache is disabled, so every cycle sends fresh queries.
//
// Failures are returned as errors; `dnsmonitor_core::traits::resolve` folds
// them into "not found".

use async_trait::async_trait;
use dnsmonitor_core::{Error, QueryType, Resolver, Result};
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{
    LookupIpStrategy, NameServerConfig, Protocol, ResolverConfig, ResolverOpts,
};
use hickory_resolver::proto::rr::{RData, Record};
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

/// Standard DNS port
const DNS_PORT: u16 = 53;

/// DNS resolver backed by hickory
pub struct HickoryResolver {
    /// Underlying async resolver
    resolver: TokioAsyncResolver,

    /// Human-readable description of the nameserver in use
    description: String,
}

impl std::fmt::Debug for HickoryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HickoryResolver")
            .field("description", &self.description)
            .finish()
    }
}

impl HickoryResolver {
    /// Create a resolver from the system configuration
    pub fn from_system_conf() -> Result<Self> {
        let (config, options) = hickory_resolver::system_conf::read_system_conf()
            .map_err(|e| Error::config(format!("Failed to read system resolver config: {}", e)))?;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, fresh_lookups(options)),
            description: "system resolver".to_string(),
        })
    }

    /// Create a resolver that sends every query to `endpoint` over UDP port 53
    ///
    /// `endpoint` may be an IP address or a host name. A host name is
    /// resolved once, here, with the system resolver.
    pub async fn with_custom_endpoint(endpoint: &str) -> Result<Self> {
        let ip = endpoint_ip(endpoint).await?;
        let socket_addr = SocketAddr::new(ip, DNS_PORT);

        let nameserver = NameServerConfig::new(socket_addr, Protocol::Udp);
        let config = ResolverConfig::from_parts(None, vec![], vec![nameserver]);
        let resolver = TokioAsyncResolver::tokio(config, fresh_lookups(ResolverOpts::default()));

        debug!("Using custom nameserver {} ({})", endpoint, socket_addr);

        Ok(Self {
            resolver,
            description: format!("nameserver {}", socket_addr),
        })
    }

    /// Create a resolver from an optional custom endpoint
    ///
    /// `None` selects the system configuration.
    pub async fn from_endpoint(endpoint: Option<&str>) -> Result<Self> {
        match endpoint {
            Some(endpoint) => Self::with_custom_endpoint(endpoint).await,
            None => Self::from_system_conf(),
        }
    }

    async fn lookup_addresses(&self, name: &str) -> Result<Vec<String>> {
        let lookup = self.resolver.lookup_ip(name).await.map_err(resolve_error)?;
        Ok(lookup.iter().map(|ip| ip.to_string()).collect())
    }

    async fn lookup_cname(&self, name: &str) -> Result<Vec<String>> {
        let lookup = self.resolver.lookup_ip(name).await.map_err(resolve_error)?;
        Ok(vec![canonical_name(name, lookup.as_lookup().records())])
    }

    async fn lookup_mx(&self, name: &str) -> Result<Vec<String>> {
        let lookup = self.resolver.mx_lookup(name).await.map_err(resolve_error)?;
        Ok(lookup.iter().map(|mx| mx.exchange().to_string()).collect())
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>> {
        let lookup = self.resolver.txt_lookup(name).await.map_err(resolve_error)?;
        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|data| String::from_utf8_lossy(data))
                    .collect::<String>()
            })
            .collect())
    }

    async fn lookup_ns(&self, name: &str) -> Result<Vec<String>> {
        let lookup = self.resolver.ns_lookup(name).await.map_err(resolve_error)?;
        Ok(lookup.iter().map(|ns| ns.0.to_string()).collect())
    }
}

#[async_trait]
impl Resolver for HickoryResolver {
    async fn lookup(&self, query_type: QueryType, name: &str) -> Result<Vec<String>> {
        let name = fully_qualified(name)?;

        match query_type {
            QueryType::A => self.lookup_addresses(&name).await,
            QueryType::Cname => self.lookup_cname(&name).await,
            QueryType::Mx => self.lookup_mx(&name).await,
            QueryType::Txt => self.lookup_txt(&name).await,
            QueryType::Ns => self.lookup_ns(&name).await,
        }
    }

    fn resolver_name(&self) -> &str {
        &self.description
    }
}

/// No answer cache, and address lookups return IPv4 and IPv6 together
fn fresh_lookups(mut options: ResolverOpts) -> ResolverOpts {
    options.cache_size = 0;
    options.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
    options
}

/// Append the root label so search domains are never tried
///
/// A name made only of dots would become the root zone and is refused.
fn fully_qualified(name: &str) -> Result<String> {
    let name = name.trim_end_matches('.');
    if name.is_empty() {
        return Err(Error::resolution("Refusing to query the root zone"));
    }
    Ok(name.to_owned() + ".")
}

/// Follow the CNAME chain in `records` starting at `name`
///
/// Returns `name` when it has no CNAME.
fn canonical_name(name: &str, records: &[Record]) -> String {
    let mut current = name.to_string();

    // Every hop uses up a record, which bounds a looping chain
    for _ in 0..records.len() {
        let target = records.iter().find_map(|record| match record.data() {
            Some(RData::CNAME(cname))
                if record.name().to_string().eq_ignore_ascii_case(&current) =>
            {
                Some(cname.0.to_string())
            }
            _ => None,
        });

        match target {
            Some(target) => current = target,
            None => break,
        }
    }

    current
}

fn resolve_error(e: hickory_resolver::error::ResolveError) -> Error {
    Error::resolution(e.to_string())
}

/// Turn a custom endpoint into an IP address
async fn endpoint_ip(endpoint: &str) -> Result<IpAddr> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(Error::config("Custom DNS server cannot be empty"));
    }

    if let Ok(ip) = endpoint.parse::<IpAddr>() {
        return Ok(ip);
    }

    tokio::net::lookup_host((endpoint, DNS_PORT))
        .await
        .map_err(|e| Error::config(format!("Unable to resolve DNS server {}: {}", endpoint, e)))?
        .map(|addr| addr.ip())
        .next()
        .ok_or_else(|| Error::config(format!("DNS server {} has no address", endpoint)))
}
