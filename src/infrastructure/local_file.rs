use std::path::Path;
use tracing::{debug, info, warn};
use crate::domain::error::ImportError;

const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "txt"];

/// An uploaded file, read fully into memory.
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub name: String,
    pub text: String,
}

/// Reads a local `.csv`/`.txt` file as UTF-8 text.
pub async fn read_import_file(path: impl AsRef<Path>) -> Result<ImportFile, ImportError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        warn!("Rejecting '{}': unsupported extension '{}'", name, extension);
        return Err(ImportError::UnsupportedFile(name));
    }

    debug!("Reading import file {}", path.display());
    let text = tokio::fs::read_to_string(path).await?;
    info!("Read '{}' ({} bytes)", name, text.len());

    Ok(ImportFile { name, text })
}
