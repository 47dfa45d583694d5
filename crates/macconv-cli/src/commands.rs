//! Command handlers
//!
//! Each handler validates its arguments, calls into the library crates and
//! prints the result in the configured format.

use crate::config::AppConfig;
use crate::output::{emit, field, heading, OutputFormat, Report};
use colored::Colorize;
use macconv_cidr::{CidrInfo, HOSTS_TOO_LARGE};
use macconv_core::{validate, Result};
use macconv_dhcp::Encoded;
use macconv_juniper::Subscriber;
use macconv_mac::{LetterCase, MacAddress, Rendering};
use macconv_probe::{
    AttemptReport, DnsResolver, Probe, ProbeSettings, ProbeSummary, SystemClock, Target,
    TcpConnector,
};
use serde::Serialize;
use std::io::{self, Write};
use std::net::Ipv4Addr;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct MacReport {
    pub input: String,
    pub address: MacAddress,
    pub renderings: Vec<Rendering>,
}

impl Report for MacReport {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        heading(out, "MAC Address")?;
        for rendering in &self.renderings {
            let label = match rendering.case {
                LetterCase::Lower => rendering.style.to_string(),
                LetterCase::Upper => rendering.style.to_uppercase(),
            };
            field(out, &label, &rendering.value)?;
        }
        writeln!(out)
    }

    fn csv_header(&self) -> &'static [&'static str] {
        &["style", "case", "value"]
    }

    fn csv_records(&self) -> Vec<Vec<String>> {
        self.renderings
            .iter()
            .map(|r| {
                let case = match r.case {
                    LetterCase::Lower => "lower",
                    LetterCase::Upper => "upper",
                };
                vec![r.style.to_string(), case.to_string(), r.value.clone()]
            })
            .collect()
    }
}

pub fn mac(input: &str, config: &AppConfig) -> Result<()> {
    let address = MacAddress::parse(input)?;
    let report = MacReport {
        input: input.to_string(),
        address,
        renderings: address.renderings(),
    };
    emit(&report, config.output)?;
    Ok(())
}

fn hosts_display(total: i64) -> String {
    if total == HOSTS_TOO_LARGE {
        format!("{} (too many to count)", total)
    } else {
        total.to_string()
    }
}

impl Report for CidrInfo {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        heading(out, &format!("{} Network", self.version()))?;
        field(out, "Address", self.address())?;
        field(out, "Prefix length", self.prefix_len())?;
        field(out, "Bit length", self.bit_length())?;
        field(out, "Network", self.network_id())?;
        field(out, "First usable", self.first_ip())?;
        field(out, "Last usable", self.last_ip())?;
        match self.broadcast_address() {
            Some(broadcast) => field(out, "Broadcast", broadcast)?,
            None => field(out, "Broadcast", "-".dimmed())?,
        }
        field(out, "Subnet mask", self.subnet_mask())?;
        field(out, "Inverse mask", self.inverse_mask())?;
        field(out, "Total hosts", hosts_display(self.total_hosts()))?;
        writeln!(out)
    }

    fn csv_header(&self) -> &'static [&'static str] {
        &[
            "address",
            "version",
            "prefix_len",
            "network_id",
            "first_ip",
            "last_ip",
            "broadcast_address",
            "subnet_mask",
            "inverse_mask",
            "total_hosts",
        ]
    }

    fn csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.address().to_string(),
            self.version().to_string(),
            self.prefix_len().to_string(),
            self.network_id().to_string(),
            self.first_ip().to_string(),
            self.last_ip().to_string(),
            self.broadcast_address()
                .map_or(String::new(), |b| b.to_string()),
            self.subnet_mask().to_string(),
            self.inverse_mask().to_string(),
            self.total_hosts().to_string(),
        ]]
    }
}

pub fn ip(cidr: &str, config: &AppConfig) -> Result<()> {
    let info = macconv_cidr::compute(cidr)?;
    emit(&info, config.output)?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct DhcpReport {
    pub servers: Vec<Ipv4Addr>,
    pub encodings: Vec<Encoded>,
}

impl Report for DhcpReport {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        heading(out, "DHCP Option 43")?;
        for encoded in &self.encodings {
            field(out, &format!("{} Format", encoded.format), &encoded.hex)?;
        }
        for encoded in &self.encodings {
            field(out, &format!("{} Bytes", encoded.format), &encoded.bytes)?;
        }
        writeln!(out)
    }

    fn csv_header(&self) -> &'static [&'static str] {
        &["format", "hex", "bytes"]
    }

    fn csv_records(&self) -> Vec<Vec<String>> {
        self.encodings
            .iter()
            .map(|e| vec![e.format.to_string(), e.hex.clone(), e.bytes.clone()])
            .collect()
    }
}

pub fn dhcp(args: &[String], config: &AppConfig) -> Result<()> {
    let servers = macconv_dhcp::parse_servers(args)?;
    let encodings = macconv_dhcp::encode_all(&servers)?;
    emit(&DhcpReport { servers, encodings }, config.output)?;
    Ok(())
}

/// Line printed for every attempt in human mode
pub fn attempt_line(target: &Target, report: &AttemptReport) -> String {
    format!(
        "{} Port {} on {} is {}",
        report.at.to_rfc3339(),
        target.port(),
        target.host,
        report.state
    )
}

impl Report for ProbeSummary {
    /// Attempt lines are streamed while the probe runs, so only the verdict is written here
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        let verdict = if self.reachable {
            "reachable".green().bold()
        } else {
            "unreachable".red().bold()
        };
        writeln!(
            out,
            "{} {} ({}/{} attempts open)",
            self.target.addr,
            verdict,
            self.open_count(),
            self.attempts.len()
        )
    }

    fn csv_header(&self) -> &'static [&'static str] {
        &["attempt", "time", "host", "address", "state", "error"]
    }

    fn csv_records(&self) -> Vec<Vec<String>> {
        self.attempts
            .iter()
            .map(|r| {
                vec![
                    r.attempt.to_string(),
                    r.at.to_rfc3339(),
                    self.target.host.clone(),
                    self.target.addr.to_string(),
                    r.state.to_string(),
                    r.error.clone().unwrap_or_default(),
                ]
            })
            .collect()
    }
}

pub async fn tcp(host: &str, port: &str, settings: ProbeSettings, config: &AppConfig) -> Result<()> {
    let port = validate::parse_port(port)?;
    let probe = Probe::new(settings)?;
    let target = macconv_probe::resolve_target(host, port, &DnsResolver::new()).await?;
    tracing::info!(host, addr = %target.addr, "probing");

    let streaming = config.output == OutputFormat::Human;
    let summary = probe
        .run(&target, &TcpConnector, &SystemClock, |report| {
            if streaming {
                println!("{}", attempt_line(&target, report));
            }
        })
        .await;

    emit(&summary, config.output)?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct JuniperReport {
    pub path: String,
    pub subscribers: Vec<Subscriber>,
}

impl Report for JuniperReport {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        for subscriber in &self.subscribers {
            writeln!(out, "{}", subscriber)?;
        }
        Ok(())
    }

    fn csv_header(&self) -> &'static [&'static str] {
        &["ip", "mac", "input_filter"]
    }

    fn csv_records(&self) -> Vec<Vec<String>> {
        self.subscribers
            .iter()
            .map(|s| {
                vec![
                    s.ip.clone(),
                    s.mac.clone().unwrap_or_default(),
                    s.input_filter.clone().unwrap_or_default(),
                ]
            })
            .collect()
    }
}

pub fn juniper(path: &str, config: &AppConfig) -> Result<()> {
    validate::check_file_path(path)?;
    let subscribers = macconv_juniper::parse_file(Path::new(path))?;
    emit(
        &JuniperReport {
            path: path.to_string(),
            subscribers,
        },
        config.output,
    )?;
    Ok(())
}

/// Version details, always human-readable
pub fn version(config: &AppConfig, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "macconv version {}", config.version)?;
    writeln!(out, "built on {}", config.build_date)
}
