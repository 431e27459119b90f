//! Document loading.
//!
//! Turns an input file into a uniform sequence of [`Document`]s. Two formats
//! are supported: a single UTF-8 text file (one document) and a Parquet
//! dataset with a `text` column (one document per row). Anything else is
//! rejected before any processing starts.

pub mod parquet;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoaderError;

/// A source document. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Load documents from `path`, dispatching on the file extension.
///
/// `.txt` yields one document (id = file stem); `.parquet` yields one per
/// row with non-empty text. Any other extension fails fast with
/// [`LoaderError::UnsupportedExtension`].
pub fn load_documents(path: &Path) -> Result<Vec<Document>, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "txt" => load_text_file(path),
        "parquet" => parquet::read_documents(path),
        other => Err(LoaderError::UnsupportedExtension {
            extension: other.to_string(),
        }),
    }
}

fn load_text_file(path: &Path) -> Result<Vec<Document>, LoaderError> {
    let text = std::fs::read_to_string(path)?;
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("doc")
        .to_string();

    tracing::info!(path = %path.display(), chars = text.chars().count(), "Loaded text file");

    Ok(vec![Document::new(id, text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "hello world").unwrap();

        let docs = load_documents(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "notes");
        assert_eq!(docs[0].text, "hello world");
    }

    #[test]
    fn test_unsupported_extension_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "text\nhi").unwrap();

        let err = load_documents(&path).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::UnsupportedExtension { ref extension } if extension == "csv"
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_documents(Path::new("/nonexistent/input.txt")).unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
    }
}
