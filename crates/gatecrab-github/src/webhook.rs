use crate::error::{GithubError, GithubResult};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header GitHub signs deliveries with
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Webhook secret for HMAC verification
#[derive(Clone)]
pub struct WebhookSecret(Arc<SecretString>);

impl WebhookSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::new(SecretString::from(secret.into())))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Verify a delivery against its `X-Hub-Signature-256` header value
    pub fn verify(&self, header: Option<&str>, body: &[u8]) -> GithubResult<()> {
        verify_signature_header(header, body, self.expose())
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret([REDACTED])")
    }
}

/// Parse a `sha256=<hex>` header into raw signature bytes
pub fn parse_signature(header: Option<&str>) -> GithubResult<Vec<u8>> {
    let header = header.ok_or_else(|| {
        GithubError::MissingHeader(format!("{} header not found", SIGNATURE_HEADER))
    })?;

    // GitHub sends signature as "sha256=<hex>"
    let signature_hex = header.strip_prefix("sha256=").ok_or_else(|| {
        GithubError::InvalidSignature("Signature must start with 'sha256='".to_string())
    })?;

    hex::decode(signature_hex)
        .map_err(|e| GithubError::InvalidSignature(format!("Invalid hex encoding: {}", e)))
}

/// Verify HMAC-SHA256 signature using constant-time comparison
pub fn verify_signature(body: &[u8], signature: &[u8], secret: &str) -> GithubResult<()> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GithubError::AuthError(format!("HMAC initialization failed: {}", e)))?;

    mac.update(body);
    let expected = mac.finalize().into_bytes();

    if expected.ct_eq(signature).into() {
        Ok(())
    } else {
        Err(GithubError::InvalidSignature("Signature mismatch".to_string()))
    }
}

/// Parse the header and verify the body in one step
pub fn verify_signature_header(header: Option<&str>, body: &[u8], secret: &str) -> GithubResult<()> {
    let signature = parse_signature(header)?;
    verify_signature(body, &signature, secret)
}

/// Compute the `sha256=<hex>` header value for a body
pub fn sign_body(body: &[u8], secret: &str) -> GithubResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GithubError::AuthError(format!("HMAC initialization failed: {}", e)))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}
