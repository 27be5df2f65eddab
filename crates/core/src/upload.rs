//! Upload limits and file-name hygiene for task submissions and templates.

use crate::error::CoreError;

/// Default per-file upload limit (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Maximum stored length of an original file name.
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Reject empty files and files above `max_bytes`.
pub fn validate_upload_size(size: u64, max_bytes: u64) -> Result<(), CoreError> {
    if size == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".to_string()));
    }
    if size > max_bytes {
        return Err(CoreError::TooLarge(format!(
            "File is {size} bytes; the maximum allowed is {max_bytes} bytes"
        )));
    }
    Ok(())
}

/// Reduce a client-supplied file name to its final path component with
/// control and path-separator characters removed.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '<' | '>' | '|' | ':' | '*' | '?'))
        .take(MAX_FILE_NAME_LENGTH)
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Lower-cased extension of a file name, if it has one.
pub fn file_extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then(|| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn size_limits() {
        assert!(validate_upload_size(2 * 1024 * 1024, DEFAULT_MAX_UPLOAD_BYTES).is_ok());
        assert!(validate_upload_size(DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MAX_UPLOAD_BYTES).is_ok());
        assert_matches!(
            validate_upload_size(DEFAULT_MAX_UPLOAD_BYTES + 1, DEFAULT_MAX_UPLOAD_BYTES),
            Err(CoreError::TooLarge(_))
        );
        assert_matches!(
            validate_upload_size(0, DEFAULT_MAX_UPLOAD_BYTES),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn strips_directories() {
        assert_eq!(
            sanitize_file_name("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\amina\\Q1 report.docx").as_deref(),
            Some("Q1 report.docx")
        );
    }

    #[test]
    fn rejects_unusable_names() {
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name("..."), None);
        assert_eq!(sanitize_file_name("dir/"), None);
    }

    #[test]
    fn extensions() {
        assert_eq!(file_extension("report.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(".bashrc"), None);
    }
}
