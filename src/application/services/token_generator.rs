/// Symbols used for random tokens: 64 entries, so six random bits pick one
/// without bias.
pub const ALPHABET: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_+";

/// Source of unpredictable strings, used to build collision-resistant
/// file names.
pub trait TokenGenerator: Send + Sync {
    /// Returns exactly `length` characters drawn from [`ALPHABET`].
    fn generate(&self, length: usize) -> String;
}
