use std::fmt;
use std::io;

use mavbridge_frame::FrameError;
use mavbridge_relay::RelayError;
use mavbridge_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::PermissionDenied => TRANSPORT_ERROR,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::PathTooLong { .. } => CliError::usage(format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn relay_error(context: &str, err: RelayError) -> CliError {
    match err {
        RelayError::Transport(err) => transport_error(context, err),
        RelayError::Json(err) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        RelayError::RebindExhausted { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
    }
}

pub fn runtime_error(err: io::Error) -> CliError {
    CliError::new(INTERNAL, format!("async runtime setup failed: {err}"))
}

pub fn signal_error(err: ctrlc::Error) -> CliError {
    CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_map_to_transport_code() {
        let err = TransportError::Bind {
            endpoint: "0.0.0.0:14551".to_string(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert_eq!(transport_error("bind", err).code, TRANSPORT_ERROR);

        let err = TransportError::PathTooLong {
            path: "/x".into(),
            len: 200,
            max: 108,
        };
        assert_eq!(transport_error("bind", err).code, USAGE);
    }

    #[test]
    fn missing_file_is_a_transport_failure() {
        let err = io_error("read", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("read: "));
    }

    #[test]
    fn rebind_exhaustion_is_transport_failure() {
        let err = RelayError::RebindExhausted {
            attempts: 5,
            source: TransportError::Recv(io::Error::from(io::ErrorKind::ConnectionReset)),
        };
        assert_eq!(relay_error("serve", err).code, TRANSPORT_ERROR);
    }
}
