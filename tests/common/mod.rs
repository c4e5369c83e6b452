#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use php_member_props::{TokenKind, TokenStream};

/// Path of a file under `tests/fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Read and tokenize a fixture file.
pub fn load_fixture(name: &str) -> TokenStream {
    let path = fixture_path(name);
    let source = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    TokenStream::tokenize(&source)
}

/// Index of the first token of `kind` after the comment `marker`
/// (e.g. `"/* testVar */"`).
pub fn target_token(stream: &TokenStream, marker: &str, kind: TokenKind) -> usize {
    let comment = stream
        .iter()
        .position(|t| t.kind == TokenKind::Comment && t.text.trim() == marker)
        .unwrap_or_else(|| panic!("marker {marker} not found"));
    stream
        .iter()
        .skip(comment + 1)
        .find(|t| t.kind == kind)
        .map(|t| t.index)
        .unwrap_or_else(|| panic!("no {kind:?} token after {marker}"))
}

/// Index of the first token with text `text`.
pub fn token_with_text(stream: &TokenStream, text: &str) -> usize {
    stream
        .iter()
        .position(|t| t.text == text)
        .unwrap_or_else(|| panic!("token {text:?} not found"))
}
