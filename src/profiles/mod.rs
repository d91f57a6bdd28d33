pub mod commands;

use serde_json::Value;

use crate::{
    db::{
        models::profile::{PROFILE_MODES, PROFILE_MOODS, PROFILE_THEMES},
        NewProfile, ProfilePatch,
    },
    error::{ApiError, ApiResult},
    server::extract::{value_as_f64, Payload},
};

pub const MAX_NAME_CHARS: usize = 50;

fn profile_name(value: Option<&Value>) -> ApiResult<String> {
    let name = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        None | Some(Value::Null) => String::new(),
        Some(_) => return Err(ApiError::invalid("Invalid name")),
    };
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::invalid("Invalid name"));
    }
    Ok(name)
}

/// Picks `value` when it is one of `allowed`, otherwise the first entry.
fn choice(value: Option<&Value>, allowed: &[&str]) -> String {
    let requested = value.and_then(Value::as_str).map(str::trim).unwrap_or("");
    allowed
        .iter()
        .find(|option| **option == requested)
        .or_else(|| allowed.first())
        .map(|option| option.to_string())
        .unwrap_or_default()
}

pub fn parse_new_profile(payload: &Payload) -> ApiResult<NewProfile> {
    Ok(NewProfile {
        name: profile_name(payload.get("name"))?,
        mode: choice(payload.get("mode"), &PROFILE_MODES),
        theme: choice(payload.get("theme"), &PROFILE_THEMES),
        mood: choice(payload.get("mood"), &PROFILE_MOODS),
        font_scale: payload
            .get("font_scale")
            .and_then(value_as_f64)
            .unwrap_or(1.0),
    })
}

/// Unknown mode/theme/mood values normalize to their defaults; a font scale
/// that is not a number is dropped from the patch.
pub fn parse_profile_patch(payload: &Payload) -> ApiResult<ProfilePatch> {
    let mut patch = ProfilePatch::default();
    if payload.contains_key("name") {
        patch.name = Some(profile_name(payload.get("name"))?);
    }
    if payload.contains_key("mode") {
        patch.mode = Some(choice(payload.get("mode"), &PROFILE_MODES));
    }
    if payload.contains_key("theme") {
        patch.theme = Some(choice(payload.get("theme"), &PROFILE_THEMES));
    }
    if payload.contains_key("mood") {
        patch.mood = Some(choice(payload.get("mood"), &PROFILE_MOODS));
    }
    patch.font_scale = payload.get("font_scale").and_then(value_as_f64);

    if patch.is_empty() {
        return Err(ApiError::invalid("No fields"));
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn create_normalizes_choices() {
        let profile = parse_new_profile(&payload(json!({
            "name": " Night owl ",
            "mode": "party",
            "theme": "gruvbox",
            "mood": 3,
            "font_scale": "1.5",
        })))
        .unwrap();
        assert_eq!(profile.name, "Night owl");
        assert_eq!(profile.mode, "study");
        assert_eq!(profile.theme, "gruvbox");
        assert_eq!(profile.mood, "focus");
        assert_eq!(profile.font_scale, 1.5);

        let fallback =
            parse_new_profile(&payload(json!({"name": "x", "font_scale": "big"}))).unwrap();
        assert_eq!(fallback.font_scale, 1.0);
    }

    #[test]
    fn create_requires_a_short_name() {
        for body in [json!({}), json!({"name": ""}), json!({"name": "n".repeat(51)})] {
            let err = parse_new_profile(&payload(body)).unwrap_err();
            assert_eq!(err.to_string(), "Invalid name");
        }
    }

    #[test]
    fn patch_rules() {
        let patch = parse_profile_patch(&payload(json!({"mood": "zen", "font_scale": "huge"})))
            .unwrap();
        assert_eq!(patch.mood.as_deref(), Some("zen"));
        assert_eq!(patch.font_scale, None);

        let err = parse_profile_patch(&payload(json!({"font_scale": "huge"}))).unwrap_err();
        assert_eq!(err.to_string(), "No fields");

        let err = parse_profile_patch(&payload(json!({"name": "  ", "mode": "work"}))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid name");
    }
}
