//! Multipart upload ingestion.
//!
//! Every file part of a request is sniffed, checked against the caller's
//! [`UploadPolicy`], and streamed into a hidden staging file in the
//! destination directory. Staging files are renamed to their final names
//! only once the whole request has been ingested; any failure removes every
//! staging file the call created, so an error never leaves files behind.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::{
    fs,
    io::{AsyncWriteExt, BufWriter},
};
use tracing::{debug, error, info, warn};

use crate::{
    application::{
        error::UploadError,
        services::{ContentSniffer, MultipartSource, TokenGenerator, UploadPart, SNIFF_LEN},
    },
    domain::{
        config::upload_policy::UploadPolicy,
        models::uploaded_file::{base_name, file_extension, UploadedFile},
    },
};

/// Length of the random stem used when renaming uploads.
pub const RANDOM_NAME_LENGTH: usize = 25;

const WRITE_BUFFER_SIZE: usize = 64 * 1024;

pub struct UploadService {
    token_generator: Arc<dyn TokenGenerator>,
    sniffer: Arc<dyn ContentSniffer>,
}

impl UploadService {
    pub fn new(token_generator: Arc<dyn TokenGenerator>, sniffer: Arc<dyn ContentSniffer>) -> Self {
        Self {
            token_generator,
            sniffer,
        }
    }

    /// Ingests every file part of `source` into `destination`.
    ///
    /// Returns one [`UploadedFile`] per file part, in wire order. Form fields
    /// without a file name are skipped. The first failure aborts the call.
    pub async fn upload_files<S>(
        &self,
        source: S,
        destination: &Path,
        rename_files: bool,
        policy: &UploadPolicy,
    ) -> Result<Vec<UploadedFile>, UploadError>
    where
        S: MultipartSource,
    {
        self.ingest(source, destination, rename_files, policy, None)
            .await
    }

    /// Ingests a request that must carry exactly one file part.
    pub async fn upload_one_file<S>(
        &self,
        source: S,
        destination: &Path,
        rename_files: bool,
        policy: &UploadPolicy,
    ) -> Result<UploadedFile, UploadError>
    where
        S: MultipartSource,
    {
        let mut files = self
            .ingest(source, destination, rename_files, policy, Some(1))
            .await?;

        files.pop().ok_or(UploadError::CountMismatch(0))
    }

    async fn ingest<S>(
        &self,
        mut source: S,
        destination: &Path,
        rename_files: bool,
        policy: &UploadPolicy,
        expected_files: Option<usize>,
    ) -> Result<Vec<UploadedFile>, UploadError>
    where
        S: MultipartSource,
    {
        let mut budget = ByteBudget::new(policy.max_bytes());
        let mut staged = StagedFiles::default();
        let mut uploaded = Vec::new();

        while let Some(mut part) = source.next_part().await? {
            let Some(original_file_name) = part.file_name().map(str::to_string) else {
                debug!(field = ?part.field_name(), "Skipping non-file form field");
                continue;
            };

            let prefix = read_prefix(&mut part, &mut budget).await?;
            let sniffed = self.sniffer.sniff(&prefix[..prefix.len().min(SNIFF_LEN)]);

            if !policy.permits(&sniffed) {
                warn!(
                    field = ?part.field_name(),
                    declared_type = ?part.declared_content_type(),
                    sniffed_type = %sniffed,
                    "Rejected upload with disallowed file type"
                );
                return Err(UploadError::TypeRejected { sniffed });
            }

            let new_file_name = self.target_name(&original_file_name, rename_files)?;
            let target_path = destination.join(&new_file_name);
            if staged.has_target(&target_path) {
                return Err(UploadError::Parse(format!(
                    "file name \"{}\" appears more than once",
                    new_file_name
                )));
            }

            create_dir_if_not_exists(destination).await?;

            // Fixed-length name so any legal target name can be staged.
            let staging_path = destination.join(format!(
                ".{}.partial",
                self.token_generator.generate(RANDOM_NAME_LENGTH)
            ));
            staged.push(staging_path.clone(), target_path);

            let file_size = write_part(&mut part, prefix, &staging_path, &mut budget)
                .await
                .inspect_err(|e| error!(error = %e, "Failed to write uploaded file"))?;

            info!(
                original_file_name = %original_file_name,
                new_file_name = %new_file_name,
                file_size,
                sniffed_type = %sniffed,
                "Staged uploaded file"
            );

            uploaded.push(UploadedFile::new(
                original_file_name,
                new_file_name,
                file_size,
            ));
        }

        if let Some(expected) = expected_files {
            if uploaded.len() != expected {
                warn!(
                    expected,
                    received = uploaded.len(),
                    "Unexpected number of uploaded files"
                );
                return Err(UploadError::CountMismatch(uploaded.len()));
            }
        }

        staged.commit().await?;

        info!(count = uploaded.len(), destination = %destination.display(), "Upload complete");
        Ok(uploaded)
    }

    fn target_name(&self, original: &str, rename_files: bool) -> Result<String, UploadError> {
        if rename_files {
            return Ok(format!(
                "{}{}",
                self.token_generator.generate(RANDOM_NAME_LENGTH),
                file_extension(original)
            ));
        }

        let name = base_name(original);
        if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
            return Err(UploadError::Parse(
                "file name cannot be used without renaming".to_string(),
            ));
        }
        Ok(name.to_string())
    }
}

/// Creates `path` and any missing parents. Existing directories are left as
/// they are.
pub async fn create_dir_if_not_exists(path: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);
    builder.create(path).await
}

/// Running count of bytes taken from a request against its cap.
struct ByteBudget {
    limit: u64,
    consumed: u64,
}

impl ByteBudget {
    fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }

    fn take(&mut self, len: usize) -> Result<(), UploadError> {
        let next = self.consumed.saturating_add(len as u64);
        if next > self.limit {
            return Err(UploadError::SizeLimitExceeded { limit: self.limit });
        }
        self.consumed = next;
        Ok(())
    }
}

/// Reads whole chunks until at least [`SNIFF_LEN`] bytes are buffered or the
/// part ends. The buffered bytes are written out ahead of the remainder.
async fn read_prefix<P: UploadPart>(
    part: &mut P,
    budget: &mut ByteBudget,
) -> Result<Vec<u8>, UploadError> {
    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    while prefix.len() < SNIFF_LEN {
        match part.chunk().await? {
            Some(chunk) => {
                budget.take(chunk.len())?;
                prefix.extend_from_slice(&chunk);
            }
            None => break,
        }
    }
    Ok(prefix)
}

async fn write_part<P: UploadPart>(
    part: &mut P,
    prefix: Vec<u8>,
    path: &Path,
    budget: &mut ByteBudget,
) -> Result<u64, UploadError> {
    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    writer.write_all(&prefix).await?;
    let mut written = prefix.len() as u64;

    while let Some(chunk) = part.chunk().await? {
        budget.take(chunk.len())?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    writer.flush().await?;
    writer.get_mut().sync_all().await?;
    Ok(written)
}

/// Staging files created by one ingestion call, paired with their final
/// paths. Dropping the set without committing removes the staging files,
/// which also covers the request future being cancelled mid-copy.
#[derive(Default)]
struct StagedFiles {
    entries: Vec<(PathBuf, PathBuf)>,
}

impl StagedFiles {
    fn push(&mut self, staging: PathBuf, target: PathBuf) {
        self.entries.push((staging, target));
    }

    fn has_target(&self, target: &Path) -> bool {
        self.entries.iter().any(|(_, existing)| existing == target)
    }

    /// Moves every staging file to its final name. If a rename fails, files
    /// already moved by this call are removed again.
    async fn commit(mut self) -> Result<(), UploadError> {
        let entries = std::mem::take(&mut self.entries);

        for (idx, (staging, target)) in entries.iter().enumerate() {
            if let Err(e) = fs::rename(staging, target).await {
                error!(error = %e, "Failed to move staged upload into place");
                for (_, committed) in &entries[..idx] {
                    let _ = fs::remove_file(committed).await;
                }
                for (pending, _) in &entries[idx..] {
                    let _ = fs::remove_file(pending).await;
                }
                return Err(UploadError::Io(e));
            }
        }
        Ok(())
    }
}

// Runs on whichever thread drops the set, so removal is synchronous. A
// request stages one file per part, which keeps this short.
impl Drop for StagedFiles {
    fn drop(&mut self) {
        for (staging, _) in self.entries.drain(..) {
            match std::fs::remove_file(&staging) {
                Ok(()) => debug!(path = %staging.display(), "Removed staged upload"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(error = %e, path = %staging.display(), "Failed to remove staged upload"),
            }
        }
    }
}
