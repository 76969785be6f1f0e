//! Study material file storage
//!
//! Files live flat in one directory under their sanitized name. Two uploads
//! that sanitize to the same name overwrite each other; the material records
//! of both keep pointing at the surviving file.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::error::{HubError, HubResult};

/// Public path prefix that download URLs are built on
pub const DOWNLOAD_PREFIX: &str = "/static/study_materials";

/// Extensions accepted when nothing else is configured
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 9] = [
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx", "pptx",
];

/// A file written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub stored_filename: String,
    pub file_url: String,
}

/// Check the extension after the last `.` against the allow-list,
/// ignoring case.
pub fn allowed_file(filename: &str, allowed: &HashSet<String>) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => allowed.contains(&ext.to_ascii_lowercase()),
        None => false,
    }
}

/// Reduce a user-supplied filename to a safe flat basename.
///
/// Compatibility-decomposed first so accented letters keep their base
/// letter, then non-ASCII characters are dropped, path separators become word breaks,
/// words are joined with `_`, anything outside `[A-Za-z0-9_.-]` is removed
/// and leading or trailing `.`/`_` are trimmed. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE_CHARS
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("Failed to compile filename regex"));

    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    unsafe_chars
        .replace_all(&joined, "")
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// Download URL for a stored file
pub fn download_url(stored_filename: &str) -> String {
    format!("{}/{}", DOWNLOAD_PREFIX, stored_filename)
}

/// Whether a requested download name can only address a visible file
/// directly inside the upload directory.
///
/// Hidden names are refused, which also keeps in-flight `.part` files out
/// of reach.
pub fn is_flat_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
        && !name.chars().any(|c| c.is_ascii_control())
}

/// Characters left as-is in an RFC 5987 `filename*` value
const RFC5987_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// `Content-Disposition` value that forces a download.
pub fn attachment_disposition(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    let encoded = utf8_percent_encode(filename, RFC5987_VALUE);

    format!("attachment; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}

/// The upload directory plus its allow-list
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    allowed_extensions: HashSet<String>,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, allowed_extensions: HashSet<String>) -> Self {
        Self {
            dir: dir.into(),
            allowed_extensions,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate, sanitize and write an upload.
    ///
    /// The bytes go to a temporary file first and are renamed into place, so
    /// a concurrent download sees either the old file or the new one.
    pub async fn store(&self, original_filename: &str, bytes: &[u8]) -> HubResult<StoredFile> {
        if original_filename.is_empty() {
            return Err(HubError::NoFileSelected);
        }
        if !allowed_file(original_filename, &self.allowed_extensions) {
            return Err(HubError::FileTypeNotAllowed);
        }

        // Sanitizing can strip the name down to nothing or eat the extension.
        let stored_filename = secure_filename(original_filename);
        if !allowed_file(&stored_filename, &self.allowed_extensions) {
            return Err(HubError::InvalidFilename);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let final_path = self.dir.join(&stored_filename);
        let temp_path = self
            .dir
            .join(format!(".{}.{}.part", stored_filename, Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&temp_path, bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        info!(
            "Stored upload '{}' as {} ({} bytes)",
            original_filename,
            final_path.display(),
            bytes.len()
        );

        Ok(StoredFile {
            file_url: download_url(&stored_filename),
            stored_filename,
        })
    }

    /// Read a stored file. `None` when the name is not a flat filename or
    /// nothing is stored under it.
    pub async fn read(&self, name: &str) -> HubResult<Option<Vec<u8>>> {
        if !is_flat_filename(name) {
            return Ok(None);
        }

        match tokio::fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::IsADirectory => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
