use mavbridge_message::TelemetryEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixStream;
use tracing::{info, warn};

use crate::cmd::{ctrlc_token, runtime, TailArgs};
use crate::exit::{io_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_event, OutputFormat};

pub fn run(args: TailArgs, format: OutputFormat) -> CliResult<i32> {
    let cancel = ctrlc_token()?;

    runtime()?.block_on(async move {
        let stream = UnixStream::connect(&args.socket).await.map_err(|err| {
            io_error(&format!("connect to {} failed", args.socket.display()), err)
        })?;
        info!(socket = ?args.socket, "subscribed");

        let mut lines = BufReader::new(stream).lines();
        let mut printed = 0usize;

        loop {
            if args.count.is_some_and(|count| printed >= count) {
                break;
            }

            let line = tokio::select! {
                _ = cancel.cancelled() => break,
                line = lines.next_line() => line,
            };

            let Some(line) = line.map_err(|err| io_error("receive failed", err))? else {
                info!("relay closed the connection");
                return closed_early(args.count, printed);
            };

            match TelemetryEvent::from_record(&line) {
                Ok(event) => {
                    print_event(&event, None, format);
                    printed += 1;
                }
                Err(err) => warn!(error = %err, "skipping unparseable record"),
            }
        }

        Ok(SUCCESS)
    })
}

/// The relay hung up. That is only a failure if `--count` was not reached.
fn closed_early(count: Option<usize>, printed: usize) -> CliResult<i32> {
    match count {
        Some(count) if printed < count => Err(CliError::new(
            FAILURE,
            format!("relay closed the connection after {printed} of {count} events"),
        )),
        _ => Ok(SUCCESS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_close_fails_only_below_count() {
        assert_eq!(closed_early(None, 0).unwrap(), SUCCESS);
        assert_eq!(closed_early(Some(2), 2).unwrap(), SUCCESS);

        let err = closed_early(Some(5), 1).unwrap_err();
        assert_eq!(err.code, FAILURE);
        assert!(err.message.contains("1 of 5"));
    }
}
