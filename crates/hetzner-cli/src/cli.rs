//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use hetzner_api::{ActionStatus, robot::ResetType};

#[derive(Parser, Debug)]
#[command(name = "hetzner", version)]
#[command(about = "Command-line client for the Hetzner Cloud, Robot and Auction APIs", long_about = None)]
pub struct Cli {
    /// Output format (default: config file, then table)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<Format>,

    /// Config file path (default: $HETZNER_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Credentials and endpoints; each falls back to env, then the config file
#[derive(Args, Debug, Default)]
pub struct AuthArgs {
    /// Cloud API token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Cloud API endpoint
    #[arg(long, global = true)]
    pub cloud_endpoint: Option<String>,

    /// Robot web service user
    #[arg(long, global = true)]
    pub robot_user: Option<String>,

    /// Robot web service password
    #[arg(long, global = true)]
    pub robot_password: Option<String>,

    /// Robot API endpoint
    #[arg(long, global = true)]
    pub robot_endpoint: Option<String>,

    /// Auction data endpoint
    #[arg(long, global = true)]
    pub auction_endpoint: Option<String>,

    /// Items per page when listing Cloud resources
    #[arg(long, global = true)]
    pub per_page: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Aligned columns / key-value view
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cloud API
    Cloud {
        #[command(subcommand)]
        command: CloudCommand,
    },
    /// Robot (dedicated servers) API
    Robot {
        #[command(subcommand)]
        command: RobotCommand,
    },
    /// Server auction offers
    Auction {
        #[command(subcommand)]
        command: AuctionCommand,
    },
    /// Inspect or edit the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CloudCommand {
    /// Servers
    Server {
        #[command(subcommand)]
        command: ServerCommand,
    },
    /// Asynchronous actions
    Action {
        #[command(subcommand)]
        command: ActionCommand,
    },
    /// SSH keys
    #[command(name = "ssh-key")]
    SshKey {
        #[command(subcommand)]
        command: SshKeyCommand,
    },
    /// Images
    Image {
        #[command(subcommand)]
        command: ImageCommand,
    },
    /// Locations
    Location {
        #[command(subcommand)]
        command: ListOnly,
    },
    /// Server types
    #[command(name = "server-type")]
    ServerType {
        #[command(subcommand)]
        command: ListOnly,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServerCommand {
    /// List servers
    List {
        #[arg(long)]
        name: Option<String>,
        /// Label selector, e.g. `env=prod`
        #[arg(long)]
        label_selector: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Sort order, e.g. `name:asc`
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show one server
    Get { id: u64 },
    /// Create a server
    Create(CreateServerArgs),
    /// Delete a server
    Delete {
        id: u64,
        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Power on
    Poweron(PowerArgs),
    /// Hard power off
    Poweroff(PowerArgs),
    /// Soft reboot via ACPI
    Reboot(PowerArgs),
    /// Hard reset
    Reset(PowerArgs),
    /// Graceful shutdown via ACPI
    Shutdown(PowerArgs),
}

#[derive(Args, Debug)]
pub struct CreateServerArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub server_type: String,
    #[arg(long)]
    pub image: String,
    #[arg(long)]
    pub location: Option<String>,
    /// SSH key name or id (repeatable)
    #[arg(long = "ssh-key")]
    pub ssh_keys: Vec<String>,
    /// Label as `key=value` (repeatable)
    #[arg(long = "label", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,
    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug)]
pub struct PowerArgs {
    pub id: u64,
    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug, Default)]
pub struct WaitArgs {
    /// Wait for the resulting action to finish
    #[arg(long)]
    pub wait: bool,
}

#[derive(Subcommand, Debug)]
pub enum ActionCommand {
    /// List actions
    List {
        #[arg(long, value_enum)]
        status: Option<ActionStatusArg>,
    },
    /// Show one action
    Get { id: u64 },
    /// Wait for an action to finish
    Wait {
        id: u64,
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Milliseconds between status checks
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ActionStatusArg {
    Running,
    Success,
    Error,
}

impl From<ActionStatusArg> for ActionStatus {
    fn from(arg: ActionStatusArg) -> Self {
        match arg {
            ActionStatusArg::Running => ActionStatus::Running,
            ActionStatusArg::Success => ActionStatus::Success,
            ActionStatusArg::Error => ActionStatus::Error,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SshKeyCommand {
    /// List SSH keys
    List,
    /// Show one SSH key
    Get { id: u64 },
    /// Upload an SSH key
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        public_key: String,
    },
    /// Delete an SSH key
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// List images
    List {
        /// system, snapshot, backup or app
        #[arg(long = "type")]
        image_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListOnly {
    /// List all
    List,
}

#[derive(Subcommand, Debug)]
pub enum RobotCommand {
    /// Dedicated servers
    Server {
        #[command(subcommand)]
        command: RobotServerCommand,
    },
    /// Hardware and software resets
    Reset {
        #[command(subcommand)]
        command: ResetCommand,
    },
    /// Single IP addresses
    Ip {
        #[command(subcommand)]
        command: ListOnly,
    },
    /// Stored SSH keys
    Key {
        #[command(subcommand)]
        command: ListOnly,
    },
}

#[derive(Subcommand, Debug)]
pub enum RobotServerCommand {
    /// List servers
    List,
    /// Show one server
    Get { number: u64 },
}

#[derive(Subcommand, Debug)]
pub enum ResetCommand {
    /// Show supported reset types
    Options { number: u64 },
    /// Trigger a reset
    Execute {
        number: u64,
        #[arg(long = "type", value_enum, default_value = "sw")]
        reset_type: ResetTypeArg,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResetTypeArg {
    Sw,
    Hw,
    Man,
    Power,
    #[value(name = "power_long")]
    PowerLong,
}

impl From<ResetTypeArg> for ResetType {
    fn from(arg: ResetTypeArg) -> Self {
        match arg {
            ResetTypeArg::Sw => ResetType::Sw,
            ResetTypeArg::Hw => ResetType::Hw,
            ResetTypeArg::Man => ResetType::Man,
            ResetTypeArg::Power => ResetType::Power,
            ResetTypeArg::PowerLong => ResetType::PowerLong,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AuctionCommand {
    /// List current offers, cheapest first
    List {
        /// Maximum monthly price in EUR
        #[arg(long)]
        max_price: Option<f64>,
        /// Minimum RAM in GB
        #[arg(long)]
        min_ram: Option<u32>,
        /// Datacenter prefix, e.g. FSN or HEL1
        #[arg(long)]
        datacenter: Option<String>,
        /// CPU model substring
        #[arg(long)]
        cpu: Option<String>,
        /// Only offers with a fixed price
        #[arg(long)]
        fixed_price: bool,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the config with secrets redacted
    Show,
    /// Print the config file path
    Path,
    /// Set a value, e.g. `cloud.token` or `defaults.per_page`
    Set { key: String, value: String },
}

fn parse_label(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}
