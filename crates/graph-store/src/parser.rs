//! Parser for seed files.
//!
//! A seed file lists one user per line:
//!
//! ```text
//! # name::genre|genre|...
//! ana::rock|pop
//! ben::rock|jazz
//! quiet::
//! ```
//!
//! Blank lines and `#` comments are skipped. An empty genre field is a user
//! with no likes.

use crate::error::{Result, StoreError};
use crate::types::UserRecord;
use std::fs;
use std::path::Path;

const FIELD_SEPARATOR: &str = "::";
const GENRE_SEPARATOR: char = '|';

/// Parse every user from a seed file.
pub fn parse_seed_users(path: &Path) -> Result<Vec<UserRecord>> {
    let content = fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => StoreError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => StoreError::Io(err),
    })?;
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_seed_str(&content, &file)
}

/// Parse seed content already in memory. `file` is only used in errors.
pub fn parse_seed_str(content: &str, file: &str) -> Result<Vec<UserRecord>> {
    let mut users = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        users.push(parse_seed_line(trimmed, file, line_no)?);
    }
    Ok(users)
}

fn parse_seed_line(line: &str, file: &str, line_no: usize) -> Result<UserRecord> {
    let parse_error = |reason: &str| StoreError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason: reason.to_string(),
    };

    let (name, genres) = line
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| parse_error("Missing '::' separator"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(parse_error("Missing user name"));
    }
    if genres.contains(FIELD_SEPARATOR) {
        return Err(parse_error("Too many fields"));
    }

    let genres = genres.trim();
    let genres: Vec<String> = if genres.is_empty() {
        Vec::new()
    } else {
        genres
            .split(GENRE_SEPARATOR)
            .map(|g| g.trim().to_string())
            .collect()
    };
    if genres.iter().any(String::is_empty) {
        return Err(parse_error("Empty genre name"));
    }

    Ok(UserRecord::new(name, genres))
}
