use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;

use crate::exit::{runtime_error, signal_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod inject;
pub mod serve;
pub mod tail;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the relay: UDP telemetry in, JSON records out to subscribers.
    Serve(ServeArgs),
    /// Decode a captured datagram file and print its events.
    Decode(DecodeArgs),
    /// Send synthetic telemetry datagrams to a relay.
    Inject(InjectArgs),
    /// Connect to a relay's subscriber socket and print events.
    Tail(TailArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Inject(args) => inject::run(args),
        Command::Tail(args) => tail::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// UDP address to receive telemetry on.
    #[arg(long, default_value = "0.0.0.0:14551", env = "MAVBRIDGE_UDP")]
    pub udp: SocketAddr,
    /// Unix socket path subscribers connect to. Default: <tmp>/mavbridge.sock.
    #[arg(long, value_name = "PATH", env = "MAVBRIDGE_SOCKET")]
    pub socket: Option<PathBuf>,
    /// Records queued per subscriber before new ones are dropped.
    #[arg(long, default_value = "256")]
    pub queue: usize,
    /// Receive buffer in bytes; longer datagrams are truncated.
    #[arg(long, default_value = "65535")]
    pub recv_buffer: usize,
    /// Counter log interval (e.g. 5s, 500ms). 0 disables.
    #[arg(long, default_value = "5s")]
    pub stats_interval: String,
    /// Ingest rebind attempts before giving up.
    #[arg(long, default_value = "5")]
    pub max_rebind_attempts: u32,
    /// Pass every heartbeat instead of only ArduPilot quadrotors.
    #[arg(long)]
    pub all_heartbeats: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding one captured datagram.
    pub file: PathBuf,
    /// The file is hex text rather than raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Pass every heartbeat instead of only ArduPilot quadrotors.
    #[arg(long)]
    pub all_heartbeats: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Protocol {
    V1,
    V2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum InjectKind {
    Heartbeat,
    Attitude,
    Position,
    All,
}

#[derive(Args, Debug)]
pub struct InjectArgs {
    /// Relay UDP address.
    pub addr: SocketAddr,
    /// Frame format.
    #[arg(long, value_enum, default_value = "v2")]
    pub protocol: Protocol,
    /// Messages to include in each datagram.
    #[arg(long, value_enum, default_value = "all")]
    pub kind: InjectKind,
    /// Number of datagrams to send.
    #[arg(long, default_value = "1")]
    pub count: u32,
    /// Delay between datagrams (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub interval: String,
    /// Sender system id.
    #[arg(long, default_value = "1")]
    pub system_id: u8,
    /// Report the vehicle as armed in heartbeats.
    #[arg(long)]
    pub armed: bool,
}

#[derive(Args, Debug)]
pub struct TailArgs {
    /// Relay subscriber socket path.
    pub socket: PathBuf,
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `500ms` or a bare number of seconds.
pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Current-thread runtime for the async commands.
pub(crate) fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(runtime_error)
}

/// A token cancelled by Ctrl-C.
pub(crate) fn ctrlc_token() -> CliResult<CancellationToken> {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel()).map_err(signal_error)?;
    Ok(token)
}
