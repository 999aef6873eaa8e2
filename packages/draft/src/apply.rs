//! Typed field edits over the JSON view of an entity.
//!
//! serde drops keys a struct does not declare, so a misspelled path would
//! otherwise "succeed" without changing anything. After converting back, the
//! written value is read again from the re-serialized entity and must still
//! be there.

use crate::errors::DraftError;
use furrow_common::{get_path, set_path, Entity};
use serde_json::Value;

/// Deep-set `path` on a copy of `entity`.
///
/// Returns the edited entity and the value previously at `path`. The input is
/// never modified, so callers can commit the result only on success.
pub fn apply_field<T: Entity>(
    entity: &T,
    path: &str,
    value: &Value,
) -> Result<(T, Option<Value>), DraftError> {
    let mut doc = serde_json::to_value(entity)?;
    let before = set_path(&mut doc, path, value.clone())?;
    let edited: T = serde_json::from_value(doc)?;

    ensure_written(&edited, path, value)?;
    Ok((edited, before))
}

/// Fail with [`DraftError::UnknownField`] unless `value` survived the round
/// trip through `T` at `path`
pub(crate) fn ensure_written<T: Entity>(
    entity: &T,
    path: &str,
    value: &Value,
) -> Result<(), DraftError> {
    let doc = serde_json::to_value(entity)?;
    let stored = get_path(&doc, path).unwrap_or(&Value::Null);
    if holds(stored, value) {
        Ok(())
    } else {
        Err(DraftError::UnknownField(path.to_string()))
    }
}

/// Whether `stored` carries everything `written` asked for.
///
/// Numbers compare by value (`3` written into an `f64` reads back as `3.0`)
/// and an omitted key stands for `null`.
fn holds(stored: &Value, written: &Value) -> bool {
    match (stored, written) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(s, w)| holds(s, w))
        }
        (Value::Object(a), Value::Object(b)) => b
            .iter()
            .all(|(key, w)| holds(a.get(key).unwrap_or(&Value::Null), w)),
        _ => stored == written,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Plot {
        name: String,
        area: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    }

    fn plot() -> Plot {
        Plot {
            name: "North".to_string(),
            area: 12.5,
            note: None,
        }
    }

    #[test]
    fn test_known_field_is_applied() {
        let (edited, before) = apply_field(&plot(), "name", &json!("South")).unwrap();
        assert_eq!(edited.name, "South");
        assert_eq!(before, Some(json!("North")));
    }

    #[test]
    fn test_integer_into_float_field() {
        let (edited, _) = apply_field(&plot(), "area", &json!(3)).unwrap();
        assert_eq!(edited.area, 3.0);
    }

    #[test]
    fn test_null_into_skipped_option() {
        let mut noted = plot();
        noted.note = Some("shaded".to_string());

        let (edited, before) = apply_field(&noted, "note", &Value::Null).unwrap();
        assert_eq!(edited.note, None);
        assert_eq!(before, Some(json!("shaded")));
    }

    #[test]
    fn test_misspelled_field_is_rejected() {
        let original = plot();
        let result = apply_field(&original, "nmae", &json!("South"));

        assert!(matches!(result, Err(DraftError::UnknownField(path)) if path == "nmae"));
        assert_eq!(original, plot());
    }

    #[test]
    fn test_type_mismatch_is_a_shape_error() {
        let result = apply_field(&plot(), "area", &json!("large"));
        assert!(matches!(result, Err(DraftError::Shape(_))));
    }

    #[test]
    fn test_any_path_fits_a_json_value() {
        let (edited, before) = apply_field(&json!({ "a": 1 }), "b.c", &json!(2)).unwrap();
        assert_eq!(edited, json!({ "a": 1, "b": { "c": 2 } }));
        assert_eq!(before, None);
    }
}
