//! Hostname resolution filtered by address family.
//!
//! Resolution never fails: a family with no records is skipped quietly,
//! other lookup errors are logged, and whatever was gathered is returned.

use crate::error::LookupError;
use crate::types::{AddressFamily, AddressFamilyPolicy, ResolvedAddress};
use async_trait::async_trait;
use std::net::IpAddr;
use trust_dns_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;
use tracing::{debug, warn};

/// Name-to-address lookup restricted to one family.
#[async_trait]
pub trait NameLookup: Send + Sync {
    async fn lookup(&self, host: &str, family: AddressFamily) -> Result<Vec<IpAddr>, LookupError>;
}

/// DNS lookups through `trust-dns-resolver`.
///
/// Holds one resolver per family so each query asks only for A or AAAA
/// records. The hosts file is consulted as part of resolution.
pub struct DnsLookup {
    v4: TokioAsyncResolver,
    v6: TokioAsyncResolver,
}

impl DnsLookup {
    /// Build resolvers from the system resolver configuration.
    ///
    /// Falls back to the library's default upstream servers when the
    /// system configuration cannot be read.
    pub fn from_system_conf() -> Self {
        let (config, opts) = read_system_conf().unwrap_or_else(|e| {
            warn!(error = %e, "could not read system resolver configuration, using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        });
        Self::with_config(config, opts)
    }

    /// Build resolvers from an explicit configuration.
    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        let mut v4_opts = opts.clone();
        v4_opts.ip_strategy = LookupIpStrategy::Ipv4Only;
        let mut v6_opts = opts;
        v6_opts.ip_strategy = LookupIpStrategy::Ipv6Only;

        Self {
            v4: TokioAsyncResolver::tokio(config.clone(), v4_opts),
            v6: TokioAsyncResolver::tokio(config, v6_opts),
        }
    }
}

#[async_trait]
impl NameLookup for DnsLookup {
    async fn lookup(&self, host: &str, family: AddressFamily) -> Result<Vec<IpAddr>, LookupError> {
        let resolver = match family {
            AddressFamily::V4 => &self.v4,
            AddressFamily::V6 => &self.v6,
        };

        match resolver.lookup_ip(host).await {
            // The resolver answers address literals directly regardless of
            // strategy, so filter to the requested family.
            Ok(response) => Ok(response.iter().filter(|ip| family.matches(ip)).collect()),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Err(LookupError::NoRecords),
                _ => Err(LookupError::Failed(e.to_string())),
            },
        }
    }
}

/// Resolve `hostname` to unique addresses allowed by `policy`.
///
/// Address literals of an allowed family are returned as-is without any
/// lookup. Otherwise each family in the policy is queried in order (IPv4
/// first) and addresses are kept in first-seen order. An empty result means
/// the host has nothing to probe under this policy.
pub async fn resolve_hostname(
    lookup: &dyn NameLookup,
    hostname: &str,
    policy: AddressFamilyPolicy,
) -> Vec<ResolvedAddress> {
    if let Ok(ip) = hostname.parse::<IpAddr>() {
        let family = AddressFamily::of(&ip);
        if policy.includes(family) {
            return vec![ResolvedAddress::new(hostname, family)];
        }
    }

    let mut addresses: Vec<ResolvedAddress> = Vec::new();
    for &family in policy.families() {
        match lookup.lookup(hostname, family).await {
            Ok(ips) => {
                for ip in ips.into_iter().filter(|ip| family.matches(ip)) {
                    let resolved = ResolvedAddress::from_ip(ip);
                    if !addresses.contains(&resolved) {
                        addresses.push(resolved);
                    }
                }
            }
            Err(LookupError::NoRecords) => {
                debug!(host = hostname, %family, "no records");
            }
            Err(e) => {
                warn!(host = hostname, %family, error = %e, "resolution failed");
            }
        }
    }

    debug!(host = hostname, %policy, count = addresses.len(), "resolved");
    addresses
}
