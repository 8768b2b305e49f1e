use crate::application::services::{ContentSniffer, SNIFF_LEN};

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Magic-byte sniffer built on `infer`, with a plain-text fallback for
/// content that carries no signature.
#[derive(Debug, Default, Clone, Copy)]
pub struct InferContentSniffer;

impl ContentSniffer for InferContentSniffer {
    fn sniff(&self, prefix: &[u8]) -> String {
        let prefix = &prefix[..prefix.len().min(SNIFF_LEN)];
        if prefix.is_empty() {
            return TEXT_PLAIN_UTF8.to_string();
        }

        if let Some(kind) = infer::get(prefix) {
            return kind.mime_type().to_string();
        }

        if looks_like_text(prefix) {
            TEXT_PLAIN_UTF8.to_string()
        } else {
            OCTET_STREAM.to_string()
        }
    }
}

/// UTF-8 without binary control bytes. A multi-byte sequence cut off by the
/// end of the window still counts as text.
fn looks_like_text(data: &[u8]) -> bool {
    let utf8 = match std::str::from_utf8(data) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    };
    utf8 && !data.iter().copied().any(is_binary_control)
}

fn is_binary_control(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
