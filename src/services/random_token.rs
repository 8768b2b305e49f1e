use rand::{rngs::OsRng, RngCore, TryRngCore};
use tracing::warn;

use crate::application::services::{TokenGenerator, ALPHABET};

/// Token generator backed by the operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsTokenGenerator;

impl TokenGenerator for OsTokenGenerator {
    fn generate(&self, length: usize) -> String {
        let mut bytes = vec![0u8; length];
        if let Err(e) = OsRng.try_fill_bytes(&mut bytes) {
            // ThreadRng is a CSPRNG seeded from the OS.
            warn!(error = %e, "OS random source failed, using thread-local CSPRNG");
            rand::rng().fill_bytes(&mut bytes);
        }

        bytes
            .into_iter()
            .map(|b| ALPHABET[usize::from(b & 0x3F)] as char)
            .collect()
    }
}
