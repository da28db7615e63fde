use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{FromRequest, Request},
    http::header::HeaderMap,
};
use gatecrab_github::SIGNATURE_HEADER;

const EVENT_HEADER: &str = "X-GitHub-Event";
const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

/// Verified webhook payload extractor
///
/// Validates the `X-Hub-Signature-256` HMAC against the raw body before
/// anything is parsed, then captures the event name and delivery id.
#[derive(Debug)]
pub struct VerifiedWebhookPayload {
    pub event: String,
    pub delivery: Option<String>,
    pub body: Vec<u8>,
}

impl FromRequest<AppState> for VerifiedWebhookPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();

        let signature = header_str(&parts.headers, SIGNATURE_HEADER)?;

        let body_bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to read request body: {}", e)))?
            .to_vec();

        state.webhook_secret.verify(signature, &body_bytes)?;

        let event = header_str(&parts.headers, EVENT_HEADER)?
            .ok_or_else(|| ApiError::BadRequest(format!("{} header not found", EVENT_HEADER)))?
            .to_string();
        let delivery = header_str(&parts.headers, DELIVERY_HEADER)?.map(str::to_string);

        Ok(VerifiedWebhookPayload {
            event,
            delivery,
            body: body_bytes,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|e| ApiError::BadRequest(format!("Invalid {} header: {}", name, e)))
        })
        .transpose()
}
