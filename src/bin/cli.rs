//! rosgate CLI
//!
//! Runs one action against a device and prints the JSON response body.

use std::io::Read;

use clap::{Args as ClapArgs, Parser, Subcommand};
use rosgate::service;
use serde_json::{json, Map, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// rosgate CLI
#[derive(Parser, Debug)]
#[command(name = "rosgate-cli")]
#[command(about = "Safety-restricted RouterOS API client")]
#[command(version)]
struct Args {
    #[command(flatten)]
    device: DeviceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug)]
struct DeviceArgs {
    /// Device address
    #[arg(short = 'H', long, global = true, default_value = "")]
    host: String,

    /// API port
    #[arg(short, long, global = true, default_value = "8728")]
    port: u16,

    /// API user
    #[arg(short, long, global = true, default_value = "")]
    username: String,

    /// API password
    #[arg(long, global = true, env = "ROSGATE_PASSWORD", hide_env_values = true, default_value = "")]
    password: String,

    /// Use the API-SSL service
    #[arg(long, global = true)]
    tls: bool,

    /// Accept any TLS certificate (self-signed devices)
    #[arg(long, global = true)]
    insecure: bool,

    /// Connect/read/write timeout in seconds
    #[arg(short, long, global = true, default_value = "5")]
    timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Identity and resource summary
    Test,

    /// List interfaces
    Interfaces,

    /// List IP addresses
    IpAddresses,

    /// List active PPP sessions
    PppActive,

    /// List active hotspot users
    HotspotActive,

    /// List PPP profiles
    PppProfiles,

    /// List PPP secrets
    PppSecrets,

    /// Show device log
    Log {
        /// Keep only the last N entries
        #[arg(short, long, default_value = "0")]
        limit: i64,
    },

    /// Disable a PPP secret
    PppDisable(SecretTarget),

    /// Enable a PPP secret
    PppEnable(SecretTarget),

    /// Add a PPP secret
    PppAdd {
        /// Secret name
        name: String,

        /// Secret password
        secret_password: String,

        /// Service (defaults to pppoe)
        #[arg(long)]
        service: Option<String>,

        /// Profile name
        #[arg(long)]
        profile: Option<String>,

        /// Comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// Run a whitelisted read-only command
    Run {
        /// Command path, e.g. /interface/print
        command: String,

        /// Arguments as key=value (use ?key=value for queries)
        arguments: Vec<String>,
    },

    /// Run several actions on one connection
    Batch {
        /// Action names
        #[arg(required = true)]
        actions: Vec<String>,
    },

    /// Read a complete JSON request from stdin
    Request,
}

#[derive(ClapArgs, Debug)]
struct SecretTarget {
    /// Secret id (e.g. *1A)
    #[arg(long, conflicts_with = "name")]
    id: Option<String>,

    /// Secret name
    #[arg(long)]
    name: Option<String>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rosgate=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let request = match build_request(&args) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    tracing::info!("rosgate v{}", rosgate::VERSION);

    let response = service::handle_value(request);
    println!("{}", response.body_json());

    if !response.is_success() {
        std::process::exit(1);
    }
}

/// Turn CLI arguments into the same JSON request the HTTP layer sends
fn build_request(args: &Args) -> Result<Value, String> {
    let device = &args.device;
    let mut request = Map::new();
    request.insert("host".into(), json!(device.host));
    request.insert("port".into(), json!(device.port));
    request.insert("username".into(), json!(device.username));
    request.insert("password".into(), json!(device.password));
    request.insert("tls".into(), json!(device.tls));
    request.insert("tls_verify".into(), json!(!device.insecure));
    request.insert("timeout".into(), json!(device.timeout));

    let (action, params) = match &args.command {
        Commands::Request => return read_stdin_request(),
        Commands::Test => ("test_connection", json!({})),
        Commands::Interfaces => ("interfaces", json!({})),
        Commands::IpAddresses => ("ip_addresses", json!({})),
        Commands::PppActive => ("ppp_active", json!({})),
        Commands::HotspotActive => ("hotspot_active", json!({})),
        Commands::PppProfiles => ("ppp_profiles", json!({})),
        Commands::PppSecrets => ("ppp_secrets", json!({})),
        Commands::Log { limit } => ("log", json!({ "limit": limit })),
        Commands::PppDisable(target) => ("ppp_set_disabled", target.params(true)),
        Commands::PppEnable(target) => ("ppp_set_disabled", target.params(false)),
        Commands::PppAdd {
            name,
            secret_password,
            service,
            profile,
            comment,
        } => (
            "ppp_add_secret",
            json!({
                "name": name,
                "secret_password": secret_password,
                "service": service,
                "profile": profile,
                "comment": comment,
            }),
        ),
        Commands::Run { command, arguments } => {
            let mut map = Map::new();
            for arg in arguments {
                let (key, value) = arg
                    .split_once('=')
                    .ok_or_else(|| format!("argument {arg:?} is not key=value"))?;
                map.insert(key.to_string(), json!(value));
            }
            ("run", json!({ "command": command, "arguments": map }))
        }
        Commands::Batch { actions } => ("batch", json!({ "actions": actions })),
    };

    request.insert("action".into(), json!(action));
    if let Value::Object(params) = params {
        request.extend(params);
    }

    Ok(Value::Object(request))
}

fn read_stdin_request() -> Result<Value, String> {
    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .map_err(|e| format!("failed to read stdin: {e}"))?;
    serde_json::from_str(&body).map_err(|e| format!("invalid JSON request: {e}"))
}

impl SecretTarget {
    fn params(&self, disabled: bool) -> Value {
        json!({ "id": self.id, "name": self.name, "disabled": disabled })
    }
}
