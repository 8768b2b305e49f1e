/// Number of leading bytes inspected to determine a stream's type.
pub const SNIFF_LEN: usize = 512;

/// Determines the media type of content from its leading bytes. Client
/// supplied headers never reach this interface.
pub trait ContentSniffer: Send + Sync {
    /// `prefix` holds at most [`SNIFF_LEN`] bytes. Implementations always
    /// return a type, falling back to `application/octet-stream`.
    fn sniff(&self, prefix: &[u8]) -> String;
}
