//! Host name resolution
//!
//! IP literals never touch DNS; everything else goes through a [`Resolve`]
//! implementation, [`DnsResolver`] in production.

use crate::{ProbeError, Result};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Turns a host name into addresses
pub trait Resolve {
    fn resolve(&self, host: &str) -> impl Future<Output = Result<Vec<IpAddr>>>;
}

/// DNS resolver backed by hickory
///
/// Uses the system resolver configuration when it can be read, otherwise
/// hickory's defaults.
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsResolver {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    /// Create a resolver with a custom lookup timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "system resolver config unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });

        Self { resolver, timeout }
    }
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolve for DnsResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        let lookup = tokio::time::timeout(self.timeout, self.resolver.lookup_ip(host))
            .await
            .map_err(|_| ProbeError::Resolve {
                host: host.to_string(),
                reason: format!("lookup timed out after {:?}", self.timeout),
            })?
            .map_err(|e| {
                use hickory_resolver::error::ResolveErrorKind;
                if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) {
                    ProbeError::NoAddress(host.to_string())
                } else {
                    ProbeError::Resolve {
                        host: host.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        Ok(lookup.iter().collect())
    }
}

/// A resolved probe destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Host as typed by the user
    pub host: String,
    /// Address the probe connects to
    pub addr: SocketAddr,
}

impl Target {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// True when `host` is not an IP literal and needs DNS
pub fn is_hostname(host: &str) -> bool {
    strip_brackets(host).parse::<IpAddr>().is_err()
}

fn strip_brackets(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

/// Resolve `host` and pair it with `port`
///
/// IP literals (including bracketed IPv6 such as `[::1]`) are used as-is.
/// For names, the first address returned by the resolver wins.
pub async fn resolve_target<R: Resolve>(host: &str, port: u16, resolver: &R) -> Result<Target> {
    let literal = strip_brackets(host);
    let ip = match literal.parse::<IpAddr>() {
        Ok(ip) => ip,
        Err(_) => {
            let ips = resolver.resolve(host).await?;
            tracing::debug!(host, addresses = ips.len(), "resolved host");
            ips.first()
                .copied()
                .ok_or_else(|| ProbeError::NoAddress(host.to_string()))?
        }
    };

    Ok(Target {
        host: host.to_string(),
        addr: SocketAddr::new(ip, port),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct StaticResolver {
        ips: Vec<IpAddr>,
        calls: Cell<u32>,
    }

    impl StaticResolver {
        fn new(ips: Vec<IpAddr>) -> Self {
            Self {
                ips,
                calls: Cell::new(0),
            }
        }
    }

    impl Resolve for StaticResolver {
        async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
            self.calls.set(self.calls.get() + 1);
            if host.ends_with(".invalid") {
                return Err(ProbeError::Resolve {
                    host: host.to_string(),
                    reason: "no such host".to_string(),
                });
            }
            Ok(self.ips.clone())
        }
    }

    #[test]
    fn test_is_hostname() {
        assert!(!is_hostname("192.168.1.1"));
        assert!(!is_hostname("::1"));
        assert!(!is_hostname("2001:db8::1"));
        assert!(!is_hostname("[::1]"));
        assert!(is_hostname("example.com"));
        assert!(is_hostname("www.example.com"));
        assert!(is_hostname("not-a-valid-host"));
    }

    #[tokio::test]
    async fn test_literal_skips_resolver() {
        let resolver = StaticResolver::new(vec![]);
        let target = resolve_target("192.168.1.1", 80, &resolver).await.unwrap();
        assert_eq!(target.addr.to_string(), "192.168.1.1:80");
        assert_eq!(resolver.calls.get(), 0);

        let target = resolve_target("2001:db8::1", 443, &resolver).await.unwrap();
        assert_eq!(target.addr.to_string(), "[2001:db8::1]:443");

        let target = resolve_target("[::1]", 22, &resolver).await.unwrap();
        assert_eq!(target.addr.to_string(), "[::1]:22");
        assert_eq!(target.host, "[::1]");
        assert_eq!(target.port(), 22);
    }

    #[tokio::test]
    async fn test_hostname_uses_first_address() {
        let resolver = StaticResolver::new(vec![
            "10.0.0.7".parse().unwrap(),
            "10.0.0.8".parse().unwrap(),
        ]);
        let target = resolve_target("db.internal", 5432, &resolver).await.unwrap();
        assert_eq!(target.addr.to_string(), "10.0.0.7:5432");
        assert_eq!(target.host, "db.internal");
        assert_eq!(resolver.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_hostname_without_addresses() {
        let resolver = StaticResolver::new(vec![]);
        let err = resolve_target("empty.example", 80, &resolver).await.unwrap_err();
        assert!(matches!(err, ProbeError::NoAddress(ref h) if h == "empty.example"));
    }

    #[tokio::test]
    async fn test_resolve_failure() {
        let resolver = StaticResolver::new(vec![]);
        let err = resolve_target("host.invalid", 80, &resolver).await.unwrap_err();
        assert!(matches!(err, ProbeError::Resolve { .. }));
        let err: macconv_core::MacconvError = err.into();
        assert_eq!(err.kind(), macconv_core::ErrorKind::Network);
    }
}
