//! Shared helpers for command handlers.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use nimbus_core::Scope;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Replace the top-level fields of `target` with those in `patch`.
///
/// Fields the patch does not name are kept, including ones the record
/// type does not model.
pub fn merge_fields<T>(target: &T, patch: Value) -> Result<T, CliError>
where
    T: Serialize + DeserializeOwned,
{
    let Value::Object(patch) = patch else {
        return Err(CliError::Validation {
            field: "from-file".into(),
            reason: "expected a JSON object".into(),
        });
    };

    let mut merged = serde_json::to_value(target)?;
    if let Value::Object(fields) = &mut merged {
        fields.extend(patch);
    }
    Ok(serde_json::from_value(merged)?)
}

/// Parse a `key=value` scope argument; no argument means the names listing.
pub fn parse_scope(raw: Option<&str>) -> Result<Scope, CliError> {
    let Some(raw) = raw else {
        return Ok(Scope::names());
    };
    let (key, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "scope".into(),
        reason: format!("expected KEY=VALUE, got '{raw}'"),
    })?;
    Ok(Scope::new(key.trim(), value.trim()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nimbus_core::model::Firewall;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_keeps_unnamed_fields() {
        let firewall: Firewall = serde_json::from_value(json!({
            "id": "fw-1",
            "name": "web",
            "network_roles": ["web"],
            "custom_flag": true,
        }))
        .unwrap();

        let merged = merge_fields(&firewall, json!({ "name": "edge" })).unwrap();

        assert_eq!(merged.name, "edge");
        assert_eq!(merged.network_roles, vec!["web".to_owned()]);
        assert_eq!(merged.extra.get("custom_flag"), Some(&json!(true)));
    }

    #[test]
    fn merge_rejects_non_objects() {
        let firewall = Firewall::default();
        assert!(merge_fields(&firewall, json!([1, 2])).is_err());
    }

    #[test]
    fn scope_parsing() {
        assert_eq!(parse_scope(None).unwrap(), Scope::names());
        assert_eq!(
            parse_scope(Some("zone = z-1")).unwrap(),
            Scope::new("zone", "z-1")
        );
        assert!(parse_scope(Some("zone")).is_err());
    }
}
