pub mod commands;

use crate::{
    db::JournalPatch,
    error::{ApiError, ApiResult},
    server::extract::{text_field, Payload},
};

/// Title and content of a new entry; content must not be blank.
pub fn parse_new_journal(payload: &Payload) -> ApiResult<(String, String)> {
    let title = text_field(payload, "title")?;
    let content = text_field(payload, "content")?;
    if content.is_empty() {
        return Err(ApiError::invalid("content required"));
    }
    Ok((title, content))
}

/// `null` counts as absent for both fields.
pub fn parse_journal_patch(payload: &Payload) -> ApiResult<JournalPatch> {
    let present = |key: &str| payload.get(key).is_some_and(|value| !value.is_null());

    let mut patch = JournalPatch::default();
    if present("title") {
        patch.title = Some(text_field(payload, "title")?);
    }
    if present("content") {
        let content = text_field(payload, "content")?;
        if content.is_empty() {
            return Err(ApiError::invalid("content required"));
        }
        patch.content = Some(content);
    }
    if patch.is_empty() {
        return Err(ApiError::invalid("No fields"));
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn new_entry_needs_content() {
        let (title, content) =
            parse_new_journal(&payload(json!({"content": "  notes  "}))).unwrap();
        assert_eq!(title, "");
        assert_eq!(content, "notes");

        let err = parse_new_journal(&payload(json!({"title": "t", "content": " "}))).unwrap_err();
        assert_eq!(err.to_string(), "content required");
    }

    #[test]
    fn patch_ignores_nulls_and_rejects_blank_content() {
        let patch = parse_journal_patch(&payload(json!({"title": " Day 2 ", "content": null})))
            .unwrap();
        assert_eq!(patch.title.as_deref(), Some("Day 2"));
        assert_eq!(patch.content, None);

        let err = parse_journal_patch(&payload(json!({"title": null}))).unwrap_err();
        assert_eq!(err.to_string(), "No fields");

        let err = parse_journal_patch(&payload(json!({"content": ""}))).unwrap_err();
        assert_eq!(err.to_string(), "content required");
    }
}
