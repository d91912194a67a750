#![warn(missing_docs)]
//! # image-compare-contract-tests
//!
//! Locates the frozen `/compare` schemas and fixtures under the workspace
//! `contracts/` directory. The checks themselves live in `tests/`.

use std::path::PathBuf;

/// Absolute path of the workspace `contracts/` directory.
pub fn contracts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("contracts")
}

/// Reads one contract file relative to [`contracts_dir`].
///
/// # Errors
/// Propagates I/O errors for missing or unreadable files.
pub fn read_contract(relative: &str) -> std::io::Result<String> {
    std::fs::read_to_string(contracts_dir().join(relative))
}
