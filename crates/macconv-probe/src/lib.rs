//! TCP port reachability probe
//!
//! Repeatedly connects to a host and port and reports whether the port
//! answered. The probe:
//! - resolves host names once up front
//! - makes at most `max_attempts` connection attempts, each bounded by a
//!   connect timeout
//! - stops early once `required_successes` attempts in a row succeeded
//! - waits a fixed interval between attempts
//!
//! Sockets and time are behind the [`Connector`] and [`Clock`] traits so the
//! loop can be driven deterministically.
//!
//! # Examples
//!
//! ```no_run
//! use macconv_probe::{resolve_target, DnsResolver, Probe, ProbeSettings, SystemClock, TcpConnector};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let target = resolve_target("192.168.1.1", 22, &DnsResolver::new()).await?;
//! let probe = Probe::new(ProbeSettings::default())?;
//! let summary = probe
//!     .run(&target, &TcpConnector, &SystemClock, |report| println!("{:?}", report.state))
//!     .await;
//! println!("reachable: {}", summary.reachable);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Local};
use macconv_core::MacconvError;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;

pub mod resolver;

pub use resolver::{is_hostname, resolve_target, DnsResolver, Resolve, Target};

/// Probe errors
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Host name lookup failed
    #[error("failed to resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    /// Lookup succeeded but returned nothing
    #[error("no addresses found for host: {0}")]
    NoAddress(String),

    /// Settings that would never run an attempt
    #[error("invalid probe settings: {0}")]
    InvalidSettings(String),
}

impl From<ProbeError> for MacconvError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::InvalidSettings(_) => MacconvError::Validation(err.to_string()),
            _ => MacconvError::Network(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;

/// Opens a connection to test reachability
pub trait Connector {
    fn connect(&self, addr: SocketAddr, timeout: Duration) -> impl Future<Output = io::Result<()>>;
}

/// Plain TCP connect, closed immediately
pub struct TcpConnector;

impl Connector for TcpConnector {
    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> io::Result<()> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;
        drop(stream);
        Ok(())
    }
}

/// Time source for report stamps and the pause between attempts
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Wall clock and tokio timer
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Probe tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Connect timeout per attempt
    pub timeout: Duration,
    /// Pause between attempts
    pub interval: Duration,
    /// Consecutive successes that end the probe early
    pub required_successes: u32,
    /// Upper bound on attempts
    pub max_attempts: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            interval: Duration::from_secs(1),
            required_successes: 5,
            max_attempts: 10,
        }
    }
}

impl ProbeSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ProbeError::InvalidSettings(
                "attempts must be at least 1".to_string(),
            ));
        }
        if self.required_successes == 0 {
            return Err(ProbeError::InvalidSettings(
                "required successes must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ProbeError::InvalidSettings(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bounded sequence of 1-based attempt numbers
#[derive(Debug, Clone)]
pub struct Attempts {
    next: u32,
    max: u32,
}

impl Attempts {
    pub fn new(max: u32) -> Self {
        Self { next: 1, max }
    }

    /// Attempts not yet handed out
    pub fn remaining(&self) -> u32 {
        if self.next > self.max {
            0
        } else {
            self.max - self.next + 1
        }
    }
}

impl Iterator for Attempts {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next <= self.max {
            let attempt = self.next;
            self.next += 1;
            Some(attempt)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

/// Port state observed by one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Open => f.write_str("open"),
            PortState::Closed => f.write_str("closed"),
        }
    }
}

/// Outcome of one connection attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptReport {
    pub attempt: u32,
    pub at: DateTime<Local>,
    pub state: PortState,
    /// Connect error for closed attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole probe run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeSummary {
    pub target: Target,
    pub attempts: Vec<AttemptReport>,
    /// Required consecutive successes were reached
    pub reachable: bool,
}

impl ProbeSummary {
    pub fn open_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|r| r.state == PortState::Open)
            .count()
    }
}

/// Sequential reachability probe
pub struct Probe {
    settings: ProbeSettings,
}

impl Probe {
    pub fn new(settings: ProbeSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Run the probe to completion
    ///
    /// `on_attempt` sees every report as soon as its attempt finishes.
    pub async fn run<C, K, F>(
        &self,
        target: &Target,
        connector: &C,
        clock: &K,
        mut on_attempt: F,
    ) -> ProbeSummary
    where
        C: Connector,
        K: Clock,
        F: FnMut(&AttemptReport),
    {
        let mut reports = Vec::new();
        let mut consecutive = 0u32;
        let mut attempts = Attempts::new(self.settings.max_attempts);

        while let Some(attempt) = attempts.next() {
            let at = clock.now();
            let (state, error) = match connector.connect(target.addr, self.settings.timeout).await {
                Ok(()) => {
                    consecutive += 1;
                    (PortState::Open, None)
                }
                Err(e) => {
                    consecutive = 0;
                    tracing::debug!(attempt, addr = %target.addr, error = %e, "connect failed");
                    (PortState::Closed, Some(e.to_string()))
                }
            };

            let report = AttemptReport {
                attempt,
                at,
                state,
                error,
            };
            on_attempt(&report);
            reports.push(report);

            if consecutive >= self.settings.required_successes {
                tracing::info!(attempt, addr = %target.addr, "port reachable");
                break;
            }

            if attempts.remaining() > 0 {
                clock.sleep(self.settings.interval).await;
            }
        }

        ProbeSummary {
            target: target.clone(),
            attempts: reports,
            reachable: consecutive >= self.settings.required_successes,
        }
    }
}
