//! VOE: redirect page → player page with a layered text cipher
//!
//! The player page carries the source in one of three shapes, tried in
//! order until one decodes.

use async_trait::async_trait;
use serde_json::Value;

use super::{Extractor, Provider};
use crate::client::{FetchRequest, HttpClient};
use crate::decode::{
    decode_base64_utf8, extract_token, pattern, reverse_string, shift_bytes, shift_letters,
    strip_junk_tokens,
};
use crate::error::{DecodeStage, ResolveError, Result};
use crate::parser::json_script_text;

const REDIRECT_PATTERN: &str = r#"https?://[^'"<>]+"#;
const OBFUSCATED_VAR_PATTERN: &str = r"var a168c='([^']+)'";
const HLS_PATTERN: &str = r"'hls': '([^']+)'";

const JUNK_TOKENS: [&str; 7] = ["@$", "^^", "~@", "%?", "*~", "!!", "#&"];

type Strategy = fn(&str) -> Result<String>;

/// Decode strategies in the order they are tried
const STRATEGIES: [(&str, Strategy); 3] = [
    ("json_script", source_from_json_script),
    ("a168c", source_from_obfuscated_var),
    ("hls", source_from_hls_field),
];

pub struct VoeExtractor;

#[async_trait]
impl Extractor for VoeExtractor {
    fn provider(&self) -> Provider {
        Provider::Voe
    }

    async fn resolve(&self, http: &HttpClient, embed_url: &str) -> Result<String> {
        tracing::debug!("Fetching VOE embed page: {}", embed_url);
        let landing = http.get_text(FetchRequest::get(embed_url)).await?;

        let redirect_re = pattern(REDIRECT_PATTERN)?;
        let redirect_url = redirect_re
            .find(&landing)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ResolveError::Parse("VOE redirect URL not found".to_string()))?;

        tracing::debug!("Following VOE redirect: {}", redirect_url);
        let player = http.get_text(FetchRequest::get(redirect_url)).await?;

        extract_source(&player)
    }
}

/// Runs every strategy in order, returning the first decoded source
fn extract_source(html: &str) -> Result<String> {
    let mut failures = Vec::with_capacity(STRATEGIES.len());

    for (name, strategy) in STRATEGIES {
        match strategy(html) {
            Ok(source) => return Ok(source),
            Err(e) => {
                tracing::debug!("VOE strategy {} failed: {}", name, e);
                failures.push(format!("{}: {}", name, e));
            }
        }
    }

    Err(ResolveError::Parse(format!(
        "No VOE source found ({})",
        failures.join("; ")
    )))
}

/// Decodes the payload of VOE's `application/json` script node
///
/// rot13 → strip junk tokens → base64 → shift code points back by 3 →
/// reverse → base64 → JSON, reading the `source` field.
///
/// # Errors
/// `Decode` naming the stage that failed
pub fn decode_voe_payload(encoded: &str) -> Result<String> {
    let rotated = shift_letters(encoded, 13);
    let stripped = strip_junk_tokens(&rotated, &JUNK_TOKENS);
    let outer = decode_base64_utf8(&stripped, DecodeStage::Base64)?;
    let unshifted = shift_bytes(&outer, 3)?;
    let reversed = reverse_string(&unshifted);
    let json = decode_base64_utf8(&reversed, DecodeStage::InnerBase64)?;
    source_field(&json)
}

fn source_field(json: &str) -> Result<String> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ResolveError::decode(DecodeStage::Json, e))?;

    value
        .get("source")
        .and_then(Value::as_str)
        .filter(|source| !source.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ResolveError::decode(DecodeStage::Field, "missing source field"))
}

fn source_from_json_script(html: &str) -> Result<String> {
    let text = json_script_text(html)?;
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 4 {
        return Err(ResolveError::Parse(
            "VOE JSON payload too short".to_string(),
        ));
    }
    // Payload is wrapped as ["..."]
    let inner: String = chars[2..chars.len() - 2].iter().collect();
    decode_voe_payload(&inner)
}

fn source_from_obfuscated_var(html: &str) -> Result<String> {
    let encoded = extract_token(&pattern(OBFUSCATED_VAR_PATTERN)?, html, "VOE a168c variable")?;
    let decoded = decode_base64_utf8(&encoded, DecodeStage::Base64)?;
    source_field(&reverse_string(&decoded))
}

fn source_from_hls_field(html: &str) -> Result<String> {
    let encoded = extract_token(&pattern(HLS_PATTERN)?, html, "VOE hls field")?;
    decode_base64_utf8(&encoded, DecodeStage::Base64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::encode_base64;

    const SOURCE: &str = "https://example/video.m3u8";

    fn shift_up(s: &str, n: u32) -> String {
        s.chars()
            .map(|c| char::from_u32(c as u32 + n).unwrap())
            .collect()
    }

    /// Inverse of the last three decode stages' inputs: wraps an already
    /// shifted-back string the way VOE does
    fn wrap_unshifted(unshifted: &str) -> String {
        let mut outer = encode_base64(shift_up(unshifted, 3).as_bytes());
        outer.insert_str(4, "@$");
        outer.push_str("#&");
        shift_letters(&outer, 13)
    }

    fn encode_voe(json: &str) -> String {
        wrap_unshifted(&reverse_string(&encode_base64(json.as_bytes())))
    }

    fn expect_stage(result: Result<String>, expected: DecodeStage) {
        match result {
            Err(ResolveError::Decode { stage, .. }) => assert_eq!(stage, expected),
            other => panic!("Expected {} decode error, got {:?}", expected, other),
        }
    }

    #[test]
    fn test_decode_voe_payload_fixture() {
        let payload = encode_voe(r#"{"source": "https://example/video.m3u8"}"#);
        assert_eq!(decode_voe_payload(&payload).unwrap(), SOURCE);
    }

    #[test]
    fn test_decode_voe_payload_corrupt_outer_base64() {
        expect_stage(decode_voe_payload("@@@@"), DecodeStage::Base64);
    }

    #[test]
    fn test_decode_voe_payload_corrupt_shift() {
        let payload = shift_letters(&encode_base64(&[0x01, 0x41]), 13);
        expect_stage(decode_voe_payload(&payload), DecodeStage::ShiftBytes);
    }

    #[test]
    fn test_decode_voe_payload_corrupt_inner_base64() {
        expect_stage(
            decode_voe_payload(&wrap_unshifted("*&^%")),
            DecodeStage::InnerBase64,
        );
    }

    #[test]
    fn test_decode_voe_payload_corrupt_json() {
        expect_stage(decode_voe_payload(&encode_voe("not json")), DecodeStage::Json);
    }

    #[test]
    fn test_decode_voe_payload_missing_source() {
        expect_stage(
            decode_voe_payload(&encode_voe(r#"{"file": "x"}"#)),
            DecodeStage::Field,
        );
    }

    #[test]
    fn test_extract_source_json_script() {
        let html = format!(
            r#"<html><head><script type="application/json">["{}"]</script></head></html>"#,
            encode_voe(r#"{"source":"https://example/video.m3u8","title":"Ep 1"}"#)
        );
        assert_eq!(extract_source(&html).unwrap(), SOURCE);
    }

    #[test]
    fn test_extract_source_falls_back_to_obfuscated_var() {
        let reversed_json = reverse_string(r#"{"source":"https://example/video.m3u8"}"#);
        let html = format!(
            r#"<script type="application/json">["@@@@"]</script>
               <script>var a168c='{}';</script>"#,
            encode_base64(reversed_json.as_bytes())
        );
        assert_eq!(extract_source(&html).unwrap(), SOURCE);
    }

    #[test]
    fn test_extract_source_falls_back_to_hls() {
        let html = format!(
            r#"<script>var sources = {{'hls': '{}', 'video_height': 1080}};</script>"#,
            encode_base64(SOURCE.as_bytes())
        );
        assert_eq!(extract_source(&html).unwrap(), SOURCE);
    }

    #[test]
    fn test_extract_source_all_strategies_fail() {
        let html = "<html><body>Video not found</body></html>";
        match extract_source(html) {
            Err(ResolveError::Parse(msg)) => {
                assert!(msg.contains("json_script"));
                assert!(msg.contains("a168c"));
                assert!(msg.contains("hls"));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }
}
