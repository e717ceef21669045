//! Action routing.
//!
//! Maps `{ action, payload }` requests onto registry operations and wraps the result in the
//! `success`/`error` envelope. Failures never escape as panics or transport errors; they are
//! reported inside the envelope.

use api_shared::{
    ActionRequest, AddLetterReq, AddLetterRes, CatalogRes, DetailFieldRes, Envelope,
    HistoryEntryRes, LetterTypeRes, ACTION_ADD, ACTION_GET,
};
use registry_core::constants::LETTER_ADDED_MESSAGE;
use registry_core::{
    FieldCatalog, HistoryEntry, LetterRegistry, NewLetter, RegistryError, RegistryResult, Sheet,
};
use serde_json::Value;

/// Parses a raw request body and routes it.
pub fn dispatch_json<S: Sheet>(registry: &LetterRegistry<S>, body: &[u8]) -> Envelope<Value> {
    match serde_json::from_slice::<ActionRequest>(body) {
        Ok(request) => dispatch(registry, request),
        Err(e) => failure(RegistryError::Payload(e)),
    }
}

/// Routes one action request.
pub fn dispatch<S: Sheet>(registry: &LetterRegistry<S>, request: ActionRequest) -> Envelope<Value> {
    let result = match request.action.as_str() {
        ACTION_GET => history(registry).and_then(to_data),
        ACTION_ADD => add_from_payload(registry, request.payload).and_then(to_data),
        other => Err(RegistryError::UnknownAction(other.to_string())),
    };

    match result {
        Ok(data) => Envelope::success(data),
        Err(e) => failure(e),
    }
}

fn failure(err: RegistryError) -> Envelope<Value> {
    tracing::warn!("action failed: {}", err);
    Envelope::error(err.to_string())
}

fn to_data<T: serde::Serialize>(value: T) -> RegistryResult<Value> {
    serde_json::to_value(value).map_err(RegistryError::Serialization)
}

fn add_from_payload<S: Sheet>(
    registry: &LetterRegistry<S>,
    payload: Option<Value>,
) -> RegistryResult<AddLetterRes> {
    let payload = match payload {
        Some(Value::String(raw)) => serde_json::from_str(&raw).map_err(RegistryError::Payload)?,
        Some(value) => value,
        None => {
            return Err(RegistryError::InvalidInput(
                "add requires a payload".into(),
            ))
        }
    };
    let req: AddLetterReq = serde_json::from_value(payload).map_err(RegistryError::Payload)?;
    register(registry, req)
}

/// Validates and registers one letter.
///
/// # Errors
///
/// Returns an input error for a blank type or patient name or a malformed date, or the
/// registry's storage error.
pub fn register<S: Sheet>(
    registry: &LetterRegistry<S>,
    req: AddLetterReq,
) -> RegistryResult<AddLetterRes> {
    let letter = NewLetter::parse(
        &req.letter_type,
        &req.patient_name,
        &req.letter_date,
        req.detail_data,
    )?;
    let issued = registry.add_letter(letter)?;

    Ok(AddLetterRes {
        message: LETTER_ADDED_MESSAGE.to_string(),
        letter_number: issued.letter_number.into_inner(),
    })
}

/// Issuance history, most recent first.
pub fn history<S: Sheet>(registry: &LetterRegistry<S>) -> RegistryResult<Vec<HistoryEntryRes>> {
    Ok(registry.history()?.into_iter().map(history_res).collect())
}

fn history_res(entry: HistoryEntry) -> HistoryEntryRes {
    HistoryEntryRes {
        id: entry.id,
        letter_number: entry.letter_number,
        letter_type: entry.letter_type,
        letter_type_text: entry.letter_type_text,
        patient_name: entry.patient_name,
        letter_date: entry.letter_date,
        letter_date_formatted: entry.letter_date_formatted,
        detail_data: entry.detail_data,
    }
}

pub fn catalog_res(catalog: &FieldCatalog) -> CatalogRes {
    let columns = catalog.columns();

    CatalogRes {
        columns: columns.to_vec(),
        letter_types: catalog
            .letter_types()
            .map(|(code, label)| LetterTypeRes {
                code: code.to_string(),
                label: label.to_string(),
            })
            .collect(),
        detail_fields: catalog
            .detail_slots()
            .iter()
            .map(|slot| DetailFieldRes {
                key: slot.key.to_string(),
                column: columns[slot.column].clone(),
                position: slot.column,
            })
            .collect(),
    }
}

/// Whether a failure was caused by the request rather than the registry.
pub fn is_client_error(err: &RegistryError) -> bool {
    matches!(
        err,
        RegistryError::InvalidInput(_)
            | RegistryError::Text(_)
            | RegistryError::InvalidLetterDate { .. }
            | RegistryError::Payload(_)
            | RegistryError::UnknownAction(_)
    )
}
