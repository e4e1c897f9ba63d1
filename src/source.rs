use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Decode fallback order for source files that are not clean UTF-8.
const ENCODINGS: &[&Encoding] = &[UTF_8, WINDOWS_1252];

/// A source file read into memory, with the metadata the pipeline reports
/// alongside it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    /// Name of the encoding that successfully decoded the file.
    pub encoding: &'static str,
    pub line_count: usize,
    pub size_bytes: usize,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    #[error("could not decode {path} with supported encodings")]
    Undecodable { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a source file, trying each supported encoding in order.
///
/// Existence and regular-file checks happen here so callers see a structured
/// error naming the path that was actually attempted.
pub fn read_source(path: &Path) -> Result<SourceFile, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(SourceError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let size_bytes = bytes.len();
    for &encoding in ENCODINGS {
        let (content, had_errors) = decode_with(encoding, &bytes);
        if had_errors {
            continue;
        }
        let line_count = content.split('\n').count();
        return Ok(SourceFile {
            path: path.to_path_buf(),
            content,
            encoding: encoding.name(),
            line_count,
            size_bytes,
        });
    }

    Err(SourceError::Undecodable {
        path: path.to_path_buf(),
    })
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> (String, bool) {
    let (text, _, had_errors) = encoding.decode(bytes);
    (text.into_owned(), had_errors)
}
