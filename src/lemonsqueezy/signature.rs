use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verify the `x-signature` header against the exact raw request body.
///
/// The header carries a hex-encoded HMAC-SHA-256 of the body, keyed by the
/// shared webhook secret. Returns false (never an error) for an empty
/// secret, a missing/empty header, or a header that is not valid hex.
///
/// The comparison runs over decoded digest bytes in constant time; callers
/// must pass the wire bytes untouched and parse JSON only after this check.
pub fn verify_signature(raw_body: &[u8], signature_header: Option<&str>, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some(signature) = signature_header.map(str::trim).filter(|s| !s.is_empty()) else {
        return false;
    };
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(raw_body);
    let expected = mac.finalize().into_bytes();

    expected.as_slice().ct_eq(provided.as_slice()).into()
}
