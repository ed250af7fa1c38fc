//! Ticket encoding: canonical JSON wrapped in URL-safe, unpadded base64.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::{TicketError, TicketPayload};

/// Deterministic and reversible: `decode(&encode(p)?) == Ok(p)`.
///
/// Payloads that `decode` would reject are refused here as `MalformedPayload`.
pub fn encode(payload: &TicketPayload) -> Result<String, TicketError> {
    validate(payload)?;
    let json = serde_json::to_vec(payload).map_err(|e| TicketError::Encode(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode and validate a ticket. Pure: no ledger lookup.
pub fn decode(data: &str) -> Result<TicketPayload, TicketError> {
    let raw = URL_SAFE_NO_PAD
        .decode(data.trim())
        .map_err(|e| TicketError::malformed(format!("not a ticket encoding: {e}")))?;

    let payload: TicketPayload =
        serde_json::from_slice(&raw).map_err(|e| TicketError::malformed(e.to_string()))?;

    validate(&payload)?;
    Ok(payload)
}

fn validate(payload: &TicketPayload) -> Result<(), TicketError> {
    let expected_prefix = format!("REG-{}-", payload.event_id);
    if !payload.registration_id.as_str().starts_with(&expected_prefix) {
        return Err(TicketError::malformed(
            "registrationId does not belong to eventId",
        ));
    }
    if payload.account_id.trim().is_empty() {
        return Err(TicketError::malformed("accountId cannot be empty"));
    }
    if payload.event_title.trim().is_empty() {
        return Err(TicketError::malformed("eventTitle cannot be empty"));
    }
    Ok(())
}

/// Link a scanner opens to verify the ticket.
pub fn verification_link(base_url: &str, payload: &TicketPayload) -> Result<String, TicketError> {
    Ok(format!(
        "{}/tickets/verify?data={}",
        base_url.trim_end_matches('/'),
        encode(payload)?
    ))
}
