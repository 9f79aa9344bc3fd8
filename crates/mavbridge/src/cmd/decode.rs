use std::fs;

use mavbridge_message::DecoderConfig;
use mavbridge_relay::Pipeline;
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_events, print_summary, Origin, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = fs::read(&args.file)
        .map_err(|err| io_error(&format!("failed reading {}", args.file.display()), err))?;
    let datagram = if args.hex { parse_hex(&raw)? } else { raw };
    debug!(len = datagram.len(), "decoding datagram");

    let config = if args.all_heartbeats {
        DecoderConfig::unfiltered()
    } else {
        DecoderConfig::default()
    };
    let pipeline = Pipeline::new(config);
    let events: Vec<_> = pipeline
        .decode_datagram(&datagram)
        .into_iter()
        .map(|(frame, event)| (event, Some(Origin::from(&frame))))
        .collect();

    print_events(&events, format);
    print_summary(&pipeline.counters().snapshot(), format);
    Ok(SUCCESS)
}

/// Hex text to bytes. Whitespace, `:` and `0x` prefixes are ignored.
fn parse_hex(text: &[u8]) -> CliResult<Vec<u8>> {
    let text = std::str::from_utf8(text)
        .map_err(|_| CliError::new(DATA_INVALID, "hex input is not text"))?;

    let digits: Vec<u8> = text
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .flat_map(|token| {
            let token = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            token.bytes()
        })
        .collect();

    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("hex input has an odd number of digits ({})", digits.len()),
        ));
    }

    digits
        .chunks_exact(2)
        .map(|pair| match (hex_value(pair[0]), hex_value(pair[1])) {
            (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
            _ => Err(CliError::new(
                DATA_INVALID,
                format!(
                    "invalid hex digit in {:?}",
                    String::from_utf8_lossy(pair)
                ),
            )),
        })
        .collect()
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
