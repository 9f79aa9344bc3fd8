use mavbridge_message::DecoderConfig;
use mavbridge_relay::{Relay, RelayConfig};
use tracing::info;

use crate::cmd::{ctrlc_token, parse_duration, runtime, ServeArgs};
use crate::exit::{relay_error, CliError, CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat};

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = relay_config(args)?;
    let cancel = ctrlc_token()?;

    let totals = runtime()?.block_on(async move {
        let relay = Relay::bind(config)
            .await
            .map_err(|err| relay_error("bind failed", err))?;
        info!(
            udp = %relay.local_addr(),
            socket = ?relay.socket_path(),
            "press Ctrl-C to stop"
        );
        relay
            .run(cancel)
            .await
            .map_err(|err| relay_error("relay failed", err))
    })?;

    print_summary(&totals, format);
    Ok(SUCCESS)
}

fn relay_config(args: ServeArgs) -> CliResult<RelayConfig> {
    if args.queue == 0 {
        return Err(CliError::usage("--queue must be greater than zero"));
    }
    let stats = parse_duration(&args.stats_interval)?;

    Ok(RelayConfig {
        udp_addr: args.udp,
        socket_path: args
            .socket
            .unwrap_or_else(RelayConfig::default_socket_path),
        subscriber_queue: args.queue,
        recv_buffer: args.recv_buffer,
        stats_interval: (!stats.is_zero()).then_some(stats),
        max_rebind_attempts: args.max_rebind_attempts,
        decoder: if args.all_heartbeats {
            DecoderConfig::unfiltered()
        } else {
            DecoderConfig::default()
        },
    })
}
