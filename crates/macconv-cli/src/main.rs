use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use macconv_core::MacconvError;
use macconv_probe::ProbeSettings;
use std::process::ExitCode;
use std::time::Duration;

mod commands;
mod config;
mod logging;
mod output;

use config::AppConfig;
use output::OutputFormat;

/// MAC, CIDR, DHCP option 43 and TCP reachability helpers for network operators
#[derive(Parser)]
#[command(name = "macconv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a MAC address into every common notation
    Mac(MacArgs),
    /// Calculate network details for a CIDR block
    Ip(IpArgs),
    /// Encode DHCP option 43 for one or two boot servers
    Dhcp(DhcpArgs),
    /// Check whether a TCP port is reachable
    Tcp(TcpArgs),
    /// Extract subscribers from Juniper `show subscribers detail` output
    Juniper(JuniperArgs),
    /// Print version information
    Version,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Mac(_) => "mac",
            Commands::Ip(_) => "ip",
            Commands::Dhcp(_) => "dhcp",
            Commands::Tcp(_) => "tcp",
            Commands::Juniper(_) => "juniper",
            Commands::Version => "version",
        }
    }
}

#[derive(Parser)]
struct MacArgs {
    /// MAC address, e.g. 00:11:22:33:44:55, 0011.2233.4455 or 0011-2233-4455
    #[arg(value_name = "MAC")]
    address: String,
}

#[derive(Parser)]
struct IpArgs {
    /// CIDR block, e.g. 192.168.1.0/24 or 2001:db8::/32
    #[arg(value_name = "CIDR")]
    cidr: String,
}

#[derive(Parser)]
struct DhcpArgs {
    /// Boot server IPv4 addresses (one or two)
    #[arg(value_name = "IP", required = true)]
    servers: Vec<String>,
}

#[derive(Parser)]
struct TcpArgs {
    /// Host name or IP address
    #[arg(value_name = "HOST")]
    host: String,

    /// Port number (1-65535)
    #[arg(value_name = "PORT")]
    port: String,

    /// Maximum connection attempts
    #[arg(long, default_value_t = ProbeSettings::default().max_attempts)]
    attempts: u32,

    /// Consecutive successes that end the probe early
    #[arg(long, default_value_t = ProbeSettings::default().required_successes)]
    successes: u32,

    /// Connect timeout per attempt in milliseconds
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    /// Pause between attempts in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
}

impl TcpArgs {
    fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            timeout: Duration::from_millis(self.timeout_ms),
            interval: Duration::from_millis(self.interval_ms),
            required_successes: self.successes,
            max_attempts: self.attempts,
        }
    }
}

#[derive(Parser)]
struct JuniperArgs {
    /// File holding the saved command output
    #[arg(value_name = "FILE")]
    file: String,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = logging::init(&cli.log_level)?;
    let config = AppConfig::new(cli.output, log_level);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let name = cli.command.name();
    match runtime.block_on(run(cli.command, &config)) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            report_error(name, &err);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(command: Commands, config: &AppConfig) -> macconv_core::Result<()> {
    tracing::debug!(
        command = command.name(),
        output = ?config.output,
        level = %config.log_level,
        version = config.version,
        "running command"
    );

    match command {
        Commands::Mac(args) => commands::mac(&args.address, config),
        Commands::Ip(args) => commands::ip(&args.cidr, config),
        Commands::Dhcp(args) => commands::dhcp(&args.servers, config),
        Commands::Tcp(args) => {
            commands::tcp(&args.host, &args.port, args.settings(), config).await
        }
        Commands::Juniper(args) => commands::juniper(&args.file, config),
        Commands::Version => {
            commands::version(config, &mut std::io::stdout().lock())?;
            Ok(())
        }
    }
}

fn report_error(command: &str, err: &MacconvError) {
    tracing::debug!(command, kind = %err.kind(), error = ?err, "command failed");
    eprintln!("{} {}: {}", "Error:".red().bold(), err.kind(), err);

    if let Some(help) = subcommand_help(command) {
        eprintln!();
        eprintln!("{}", help);
    }
}

/// Help text for one subcommand, with the `macconv` usage prefix and global flags
fn subcommand_help(command: &str) -> Option<String> {
    let mut cli = Cli::command();
    cli.build();
    cli.find_subcommand_mut(command)
        .map(|sub| sub.render_help().to_string())
}
