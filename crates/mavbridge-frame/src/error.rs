/// Errors that can occur while building frames.
///
/// Scanning never fails; a buffer that does not hold a complete frame simply
/// yields fewer descriptors.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the 8-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The message id does not fit the framing version's id field.
    #[error("message id {id} out of range for {version} framing (max {max})")]
    MessageIdOutOfRange {
        id: u32,
        version: &'static str,
        max: u32,
    },
}

pub type Result<T> = std::result::Result<T, FrameError>;
