//! Response classification and CBOR payload decoding.

use ciborium::Value;

use super::models::{status, IamResponse, OperationKind, Outcome};
use crate::error::DecodeError;

/// Classify a status code for the given operation.
pub fn classify(kind: OperationKind, status_code: u16) -> Outcome<()> {
    if status_code == kind.success_status() {
        Outcome::Success(())
    } else if status_code == status::FORBIDDEN {
        Outcome::AccessDenied
    } else if kind.semantic_error_status() == Some(status_code) {
        Outcome::SemanticError(status_code)
    } else {
        Outcome::UnknownStatus(status_code)
    }
}

/// Classify a listing response, decoding the payload when the status signals content.
///
/// The payload is only inspected on success; error statuses never fail to decode.
pub fn decode_listing(
    kind: OperationKind,
    response: &IamResponse,
) -> Result<Outcome<Vec<String>>, DecodeError> {
    match classify(kind, response.status_code) {
        Outcome::Success(()) => decode_string_list(response.payload.as_deref()).map(Outcome::Success),
        other => Ok(other.map(|()| Vec::new())),
    }
}

/// Decode a CBOR array of text strings.
///
/// The payload must hold exactly one CBOR item.
pub fn decode_string_list(payload: Option<&[u8]>) -> Result<Vec<String>, DecodeError> {
    let mut remaining = payload.ok_or(DecodeError::MissingPayload)?;
    let value: Value =
        ciborium::from_reader(&mut remaining).map_err(|e| DecodeError::Cbor(e.to_string()))?;

    if !remaining.is_empty() {
        return Err(DecodeError::TrailingBytes(remaining.len()));
    }

    let Value::Array(items) = value else {
        return Err(DecodeError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Text(text) => Ok(text),
            _ => Err(DecodeError::NonStringEntry(idx)),
        })
        .collect()
}
