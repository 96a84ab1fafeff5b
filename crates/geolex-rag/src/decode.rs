//! # Two-Phase Verdict Decoding
//!
//! Chat models do not reliably emit bare JSON — the verdict payload often
//! arrives wrapped in prose ("Here is the evaluation: {...} Let me know...").
//! Decoding is therefore two-phase:
//!
//! 1. strict `serde_json` parse of the whole response text;
//! 2. on failure, extract the first balanced `{...}` object from the text
//!    and parse that.
//!
//! If both phases fail the caller gets
//! [`JudgmentError::MalformedOutput`](crate::error::JudgmentError) carrying
//! the raw text. Plain `Result` flow throughout — a malformed model reply
//! is an expected input, not a panic.

use serde::Deserialize;

use geolex_core::PartialComplianceMap;

use crate::error::JudgmentError;

/// The payload shape the judgment model is prompted to produce.
///
/// Both fields are optional: the model may answer with an error object or
/// omit the map entirely. Presence checks happen in the pipeline, which
/// owns the "no compliance map" failure policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerdictPayload {
    /// Per-region verdicts the model asserted. Possibly partial.
    #[serde(default, rename = "isCompliant", alias = "compliance")]
    pub is_compliant: Option<PartialComplianceMap>,
    /// The model's explanation.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Decode a model response into a [`VerdictPayload`], strictly first and
/// then via balanced-object extraction.
pub fn decode_verdict(raw: &str) -> Result<VerdictPayload, JudgmentError> {
    if let Ok(payload) = serde_json::from_str::<VerdictPayload>(raw) {
        return Ok(payload);
    }

    if let Some(candidate) = extract_json_object(raw) {
        if let Ok(payload) = serde_json::from_str::<VerdictPayload>(candidate) {
            tracing::debug!("verdict decoded from prose-wrapped payload");
            return Ok(payload);
        }
    }

    Err(JudgmentError::MalformedOutput {
        raw: raw.to_string(),
    })
}

/// Extract the first balanced `{...}` object from `text`.
///
/// Brace depth is tracked outside string literals only, with `\`-escape
/// handling inside them, so braces in quoted text do not unbalance the
/// scan. Returns `None` when no opening brace exists or the object never
/// closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
