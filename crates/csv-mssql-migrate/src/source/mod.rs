//! Input discovery and decoding.
//!
//! - Path classification: is an input a delimited file, a directory holding
//!   some, or neither
//! - [`decoder`]: header + lazy record stream for one file

pub mod decoder;

pub use decoder::{DecodedFile, Record, RecordDecoder, Records};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// What an input path designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// An existing regular file with the input extension.
    File,
    /// An existing directory with at least one such file directly inside it.
    Directory,
    /// Anything else, including paths that do not exist.
    Invalid,
}

/// Case-insensitive extension check (`extension` without the leading dot).
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn is_input_file(path: &Path, extension: &str) -> bool {
    path.is_file() && has_extension(path, extension)
}

/// Classify an input path. Never fails; unreadable or missing paths are `Invalid`.
pub fn classify(path: &Path, extension: &str) -> InputKind {
    let Ok(metadata) = fs::metadata(path) else {
        return InputKind::Invalid;
    };

    if metadata.is_file() {
        if has_extension(path, extension) {
            return InputKind::File;
        }
        return InputKind::Invalid;
    }

    if metadata.is_dir() {
        let Ok(entries) = fs::read_dir(path) else {
            return InputKind::Invalid;
        };
        let has_input = entries
            .filter_map(|e| e.ok())
            .any(|e| is_input_file(&e.path(), extension));
        if has_input {
            return InputKind::Directory;
        }
    }

    InputKind::Invalid
}

/// List the input files directly inside `dir`, in directory-listing order.
pub fn list_input_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_input_file(&path, extension) {
            files.push(path);
        } else {
            debug!("Ignoring {:?}: not a .{} file", path, extension);
        }
    }
    Ok(files)
}
