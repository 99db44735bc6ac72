use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::host::PROFILE_CLAIM;
use crate::error::DecodeError;

pub type ClaimSet = Map<String, Value>;

// Standard alphabet, padding optional: JWT segments are unpadded once
// translated from the URL-safe alphabet.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes the claims carried in the payload segment of a compact token.
/// The signature is never checked.
pub fn decode_claims(token: &str) -> Result<ClaimSet, DecodeError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() < 2 {
        return Err(DecodeError::MalformedToken(segments.len()));
    }
    let payload = segments[1].replace('-', "+").replace('_', "/");
    let bytes = PAYLOAD_ENGINE
        .decode(payload.as_bytes())
        .map_err(|err| DecodeError::InvalidEncoding(err.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
    let value: Value =
        serde_json::from_str(&text).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;
    match value {
        Value::Object(claims) => Ok(claims),
        _ => Err(DecodeError::NotAnObject),
    }
}

#[must_use]
pub fn extract_identity(claims: &ClaimSet) -> Option<String> {
    let profile_email = claims
        .get(PROFILE_CLAIM)
        .and_then(Value::as_object)
        .and_then(email_field);
    profile_email.or_else(|| email_field(claims))
}

/// Decode-then-extract; a token that cannot be decoded has no identity.
#[must_use]
pub fn identity_from_token(token: &str) -> Option<String> {
    match decode_claims(token) {
        Ok(claims) => extract_identity(&claims),
        Err(err) => {
            debug!(error = %err, "failed to decode access token claims");
            None
        }
    }
}

fn email_field(claims: &ClaimSet) -> Option<String> {
    claims
        .get("email")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
}
