use anyhow::{Result, anyhow};
use std::path::Path;

/// Maximum stored filename length in bytes
pub const MAX_FILENAME_LEN: usize = 255;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Reduces an uploaded filename to its last path component, which serves as
/// both the duplicate-check key and the mirror path. The component itself is
/// kept byte for byte.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    // Treat backslashes as separators too, browsers on Windows may send full paths
    let normalized = filename.replace('\\', "/");
    let name = Path::new(&normalized)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename cannot be empty".to_string(),
        }));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path components stripped from upload filename: {}", filename);
    }

    if name.chars().any(char::is_control) {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename contains control characters".to_string(),
        }));
    }

    if name.len() > MAX_FILENAME_LEN {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: format!("Filename exceeds {} bytes", MAX_FILENAME_LEN),
        }));
    }

    if name.starts_with('.') {
        return Err(anyhow!(ValidationError {
            code: "HIDDEN_FILE",
            message: "Hidden files (starting with '.') are not allowed".to_string(),
        }));
    }

    Ok(name.to_string())
}

/// Validates the picture payload after the form has been read.
pub fn validate_picture(data: &[u8], max_size: usize) -> Result<()> {
    if data.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "EMPTY_FILE",
            message: "Uploaded picture is empty".to_string(),
        }));
    }

    if data.len() > max_size {
        return Err(anyhow!(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes",
                data.len(),
                max_size
            ),
        }));
    }

    Ok(())
}
