//! Per-file schema comparison.
//!
//! Turns the old and new contents of one schema file into a [`Verdict`]. The
//! two failure variants are kept apart because they mean different things to
//! the reader of the report: a parse failure points at the SDL itself, a
//! compare failure means the documents were readable but could not be
//! compared.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::api::FileContent;

use super::diff::{BreakingChange, find_breaking_changes};
use super::model::{Schema, SchemaBuildError};

/// The result of comparing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// One of the documents is not a valid schema.
    ParseFailure(String),
    /// The documents could not be decoded or compared.
    CompareFailure(String),
    /// The comparison ran. An empty list means the file is clean.
    Success(Vec<BreakingChange>),
}

impl Verdict {
    /// Returns true if the file needs no mention in the report.
    pub fn is_clean(&self) -> bool {
        matches!(self, Verdict::Success(changes) if changes.is_empty())
    }
}

/// The analysis of one changed schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFileResult {
    /// Path of the file at head.
    pub file: String,
    /// Link to the file at head.
    pub content_url: String,
    pub verdict: Verdict,
}

/// Content could not be turned into text.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("unsupported content encoding: {0}")]
    UnsupportedEncoding(String),
}

/// Decodes file content into text.
///
/// The contents API wraps base64 at 60 columns, so whitespace is removed
/// before decoding.
pub fn decode_content(content: &FileContent) -> Result<String, DecodeError> {
    match content.encoding.as_str() {
        "base64" => {
            let compact: String = content
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let bytes = STANDARD.decode(compact)?;
            Ok(String::from_utf8(bytes)?)
        }
        "" | "utf-8" | "utf8" => Ok(content.content.clone()),
        other => Err(DecodeError::UnsupportedEncoding(other.to_string())),
    }
}

/// Compares the old and new versions of one file.
pub fn compare(old: &FileContent, new: &FileContent) -> Verdict {
    let decoded = decode_content(old).and_then(|old| Ok((old, decode_content(new)?)));
    let (old_sdl, new_sdl) = match decoded {
        Ok(pair) => pair,
        Err(e) => return Verdict::CompareFailure(e.to_string()),
    };

    let schemas = Schema::parse(&old_sdl).and_then(|old| Ok((old, Schema::parse(&new_sdl)?)));
    match schemas {
        Ok((old, new)) => Verdict::Success(find_breaking_changes(&old, &new)),
        Err(e) => build_failure(e),
    }
}

fn build_failure(error: SchemaBuildError) -> Verdict {
    if error.is_syntax_or_structure() {
        Verdict::ParseFailure(error.to_string())
    } else {
        Verdict::CompareFailure(error.to_string())
    }
}
