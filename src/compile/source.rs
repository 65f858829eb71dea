//! Contract source discovery
//!
//! Finds `.sol` files and extracts declared contract names by scanning the
//! source text. The scan is deliberately lightweight: the first identifier
//! after a `contract` keyword wins, the same match every stage keys on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// List `.sol` files directly under `dir`, sorted by path.
pub fn list_sources(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "sol") {
            sources.push(path);
        }
    }

    sources.sort();
    Ok(sources)
}

/// Extract the first declared contract name from source text.
///
/// Returns `None` when the file declares nothing recognizable.
pub fn contract_name(source: &str) -> Option<String> {
    let mut tokens = source.split_whitespace();

    while let Some(token) = tokens.next() {
        if token == "contract" {
            if let Some(next) = tokens.next() {
                let name = leading_identifier(next);
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
    }

    None
}

/// Whether `source` declares a contract with exactly this name.
pub fn declares_contract(source: &str, name: &str) -> bool {
    let mut tokens = source.split_whitespace();

    while let Some(token) = tokens.next() {
        if token == "contract" {
            if let Some(next) = tokens.next() {
                if leading_identifier(next) == name {
                    return true;
                }
            }
        }
    }

    false
}

/// Locate the source file declaring the named contract.
pub fn find_source(dir: &Path, name: &str) -> io::Result<Option<(PathBuf, String)>> {
    for path in list_sources(dir)? {
        let text = fs::read_to_string(&path)?;
        if declares_contract(&text, name) {
            return Ok(Some((path, text)));
        }
    }

    Ok(None)
}

/// The identifier prefix of a token (`Foo{` → `Foo`).
fn leading_identifier(token: &str) -> &str {
    let end = token
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(token.len());
    &token[..end]
}
