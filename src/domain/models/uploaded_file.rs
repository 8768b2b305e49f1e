use serde::{Deserialize, Serialize};

/// A file that passed type validation and was fully written to the
/// destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Name declared by the client. Untrusted, display only.
    #[serde(rename = "originalFileName")]
    pub original_file_name: String,
    /// Name actually used on disk.
    #[serde(rename = "newFileName")]
    pub new_file_name: String,
    #[serde(rename = "fileSize")]
    pub file_size: u64,
}

impl UploadedFile {
    pub fn new(original_file_name: String, new_file_name: String, file_size: u64) -> Self {
        Self {
            original_file_name,
            new_file_name,
            file_size,
        }
    }

    /// Extension of the client-declared name including the leading dot,
    /// or an empty string when there is none.
    pub fn original_extension(&self) -> &str {
        file_extension(&self.original_file_name)
    }
}

/// Returns the extension of `file_name` verbatim, including the dot.
///
/// Only the final path component is considered; the extension starts at
/// its last dot.
pub fn file_extension(file_name: &str) -> &str {
    let base = base_name(file_name);
    base.rfind('.').map(|idx| &base[idx..]).unwrap_or("")
}

/// Final component of a client-supplied path, splitting on both `/` and `\\`.
pub fn base_name(file_name: &str) -> &str {
    file_name.rsplit(['/', '\\']).next().unwrap_or(file_name)
}
