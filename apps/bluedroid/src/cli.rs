//! # CLI Module
//!
//! Command definitions and their implementations.
//!
//! Each `cmd_*` function wires the core to the real platform, runs one
//! operation and prints the result (plain text, or JSON with `--json`).

use crate::config::{AppConfig, CliError};
use crate::platform::{CommandServices, LinuxHci, SysfsControl};
use bluedroid_core::{
    format_address, parse_address, BdAddr, BluetoothController, ControllerConfig, ModuleStatus,
    PowerSequencer, RadioStatus, ThreadDelay,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Bluetooth radio power and lifecycle control.
#[derive(Debug, Parser)]
#[command(name = "bluedroid", version, about)]
pub struct Cli {
    /// JSON configuration file (defaults apply when omitted).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Power the radio, attach firmware, bring hci up and start the stack.
    Enable,
    /// Stop the stack, bring hci down, stop attach and cut power.
    Disable,
    /// Report power and interface state.
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Drive or check the power control lines only.
    Power {
        #[arg(value_enum)]
        action: PowerAction,
        #[arg(long)]
        json: bool,
    },
    /// Bluetooth address conversions.
    Addr {
        #[command(subcommand)]
        command: AddrCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    On,
    Off,
    Check,
}

#[derive(Debug, Subcommand)]
pub enum AddrCommand {
    /// Format six wire-order bytes (hex) as XX:XX:XX:XX:XX:XX.
    Format {
        #[arg(num_args = 6, required = true)]
        bytes: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Parse XX:XX:XX:XX:XX:XX into wire-order bytes.
    Parse {
        address: String,
        /// Reject anything but six colon-separated hex pairs.
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },
}

// =============================================================================
// PLATFORM WIRING
// =============================================================================

pub type PlatformController = BluetoothController<SysfsControl, ThreadDelay, LinuxHci, CommandServices>;

pub fn build_controller(config: &AppConfig) -> PlatformController {
    BluetoothController::new(
        SysfsControl,
        ThreadDelay,
        LinuxHci,
        CommandServices::new(config.services.clone()),
        &config.controller,
    )
}

pub fn build_sequencer(config: &ControllerConfig) -> PowerSequencer<SysfsControl, ThreadDelay> {
    let status = ModuleStatus::new(SysfsControl, ThreadDelay, config.timing.settle());
    PowerSequencer::new(status, &config.lines)
}

// =============================================================================
// COMMANDS
// =============================================================================

pub fn run(cli: &Cli, config: &AppConfig) -> Result<(), CliError> {
    match &cli.command {
        Commands::Enable => cmd_enable(config),
        Commands::Disable => cmd_disable(config),
        Commands::Status { json } => cmd_status(config, *json),
        Commands::Power { action, json } => cmd_power(config, *action, *json),
        Commands::Addr { command } => match command {
            AddrCommand::Format { bytes, json } => cmd_addr_format(bytes, *json),
            AddrCommand::Parse {
                address,
                strict,
                json,
            } => cmd_addr_parse(address, *strict, *json),
        },
    }
}

pub fn cmd_enable(config: &AppConfig) -> Result<(), CliError> {
    build_controller(config).enable()?;
    info!("bluetooth enabled");
    println!("enabled");
    Ok(())
}

pub fn cmd_disable(config: &AppConfig) -> Result<(), CliError> {
    build_controller(config).disable()?;
    info!("bluetooth disabled");
    println!("disabled");
    Ok(())
}

pub fn cmd_status(config: &AppConfig, json: bool) -> Result<(), CliError> {
    let status = build_controller(config).status()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", render_status(&status));
    }
    Ok(())
}

/// Plain-text rendering of a status report.
pub fn render_status(status: &RadioStatus) -> String {
    let mut out = format!(
        "power:   {}\nenabled: {}\n",
        on_off(status.powered),
        if status.enabled { "yes" } else { "no" }
    );
    if let Some(device) = &status.device {
        out.push_str(&format!(
            "device:  {} {} (flags {:#x})\n",
            device.name, device.address, device.flags
        ));
    }
    out
}

/// Result of a `power` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PowerReport {
    pub action: PowerAction,
    pub powered: bool,
}

/// Run a power action against the configured control lines.
pub fn power(config: &ControllerConfig, action: PowerAction) -> Result<PowerReport, CliError> {
    let mut sequencer = build_sequencer(config);
    let powered = match action {
        PowerAction::On => sequencer.set_power(true)?,
        PowerAction::Off => sequencer.set_power(false)?,
        PowerAction::Check => sequencer.check_power()?,
    };
    Ok(PowerReport { action, powered })
}

pub fn cmd_power(config: &AppConfig, action: PowerAction, json: bool) -> Result<(), CliError> {
    let report = power(&config.controller, action)?;
    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("power: {}", on_off(report.powered));
    }
    Ok(())
}

/// Turn six hex byte arguments into an address string.
pub fn format_bytes(bytes: &[String]) -> Result<String, CliError> {
    let mut wire = [0u8; 6];
    if bytes.len() != wire.len() {
        return Err(CliError::InvalidByte(bytes.join(" ")));
    }
    for (slot, text) in wire.iter_mut().zip(bytes) {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        *slot = u8::from_str_radix(digits, 16).map_err(|_| CliError::InvalidByte(text.clone()))?;
    }
    Ok(format_address(wire))
}

pub fn cmd_addr_format(bytes: &[String], json: bool) -> Result<(), CliError> {
    let address = format_bytes(bytes)?;
    if json {
        println!("{}", serde_json::json!({ "address": address }));
    } else {
        println!("{address}");
    }
    Ok(())
}

/// Parse an address, strictly or with the lenient legacy scanner.
pub fn parse_bytes(input: &str, strict: bool) -> Result<[u8; 6], CliError> {
    if strict {
        Ok(input.parse::<BdAddr>()?.bytes())
    } else {
        Ok(parse_address(input))
    }
}

pub fn cmd_addr_parse(input: &str, strict: bool, json: bool) -> Result<(), CliError> {
    let bytes = parse_bytes(input, strict)?;
    if json {
        println!("{}", serde_json::json!({ "bytes": bytes }));
    } else {
        let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
        println!("{}", hex.join(" "));
    }
    Ok(())
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
