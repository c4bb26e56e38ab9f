//! String and byte transforms used to undo provider obfuscation
//!
//! Everything here is pure: no I/O, no shared state.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::error::{DecodeStage, ResolveError, Result};

/// Separator the junk tokens are first replaced with
const JUNK_SEPARATOR: &str = "_";

/// Rotates ASCII letters by `n` positions, preserving case
///
/// Non-letters pass through unchanged. With `n = 13` this is ROT13
/// and therefore its own inverse.
pub fn shift_letters(input: &str, n: u8) -> String {
    let n = n % 26;
    input
        .chars()
        .map(|c| match c {
            'A'..='Z' => (((c as u8 - b'A' + n) % 26) + b'A') as char,
            'a'..='z' => (((c as u8 - b'a' + n) % 26) + b'a') as char,
            _ => c,
        })
        .collect()
}

/// Removes every occurrence of the given tokens
///
/// Tokens are applied in order, each replaced by a separator marker;
/// all markers are dropped at the end. Note that this also drops any
/// marker character already present in the input.
pub fn strip_junk_tokens(input: &str, tokens: &[&str]) -> String {
    let marked = tokens
        .iter()
        .filter(|token| !token.is_empty())
        .fold(input.to_string(), |acc, token| {
            acc.replace(token, JUNK_SEPARATOR)
        });
    marked.replace(JUNK_SEPARATOR, "")
}

/// Subtracts `n` from every character's code point
///
/// # Errors
/// `Decode` at [`DecodeStage::ShiftBytes`] when a code point would go
/// below zero or land outside the valid scalar range.
pub fn shift_bytes(input: &str, n: u32) -> Result<String> {
    input
        .chars()
        .map(|c| {
            (c as u32)
                .checked_sub(n)
                .and_then(char::from_u32)
                .ok_or_else(|| {
                    ResolveError::decode(
                        DecodeStage::ShiftBytes,
                        format!("cannot shift {:?} back by {}", c, n),
                    )
                })
        })
        .collect()
}

/// Standard padded base64
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes standard padded base64, ignoring surrounding whitespace
///
/// # Errors
/// `Decode` at [`DecodeStage::Base64`]
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(input.trim())
        .map_err(|e| ResolveError::decode(DecodeStage::Base64, e))
}

/// Decodes base64 into a UTF-8 string, reporting failures as `stage`
pub fn decode_base64_utf8(input: &str, stage: DecodeStage) -> Result<String> {
    let bytes = STANDARD
        .decode(input.trim())
        .map_err(|e| ResolveError::decode(stage, e))?;
    String::from_utf8(bytes).map_err(|e| ResolveError::decode(stage, e))
}

/// Reverses a string by characters
pub fn reverse_string(input: &str) -> String {
    input.chars().rev().collect()
}

/// Compiles a pattern, reporting failures as parse errors
pub fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| ResolveError::Parse(format!("invalid pattern {}: {}", re, e)))
}

/// Returns the first capture group of `pattern` in `haystack`
///
/// # Errors
/// `Parse` naming `what` when the pattern does not match
pub fn extract_token(pattern: &Regex, haystack: &str, what: &str) -> Result<String> {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ResolveError::Parse(format!("{} not found", what)))
}
