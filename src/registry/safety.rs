//! Safety policy
//!
//! Checks applied before anything reaches the wire: the read-only whitelist
//! for arbitrary commands and the PPP secret name rules.

use serde_json::Value;

use crate::error::{Result, RosgateError};

/// Command path prefixes `run` may target
pub const RUN_WHITELIST: &[&str] = &[
    "/interface",
    "/ip/address",
    "/system/resource",
    "/ip/hotspot/active",
    "/ppp/active",
    "/log",
];

/// Verbs that only read device state
pub const READ_VERBS: &[&str] = &["print", "getall"];

/// Check an arbitrary command path against the whitelist
///
/// Prefixes match whole path segments, so `/interfaces/print` is not covered
/// by `/interface`.
pub fn check_run_command(path: &str) -> Result<()> {
    if path.is_empty() || !path.starts_with('/') {
        return Err(RosgateError::Validation(format!("invalid command {path:?}")));
    }

    let allowed = RUN_WHITELIST.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    });
    if !allowed {
        return Err(RosgateError::SafetyPolicy(format!(
            "{path} is outside the read-only command whitelist"
        )));
    }

    let verb = path.rsplit('/').next().unwrap_or_default();
    if !READ_VERBS.contains(&verb) {
        return Err(RosgateError::SafetyPolicy(format!(
            "{path} is not a read-only command"
        )));
    }

    Ok(())
}

/// Turn `run` arguments into attribute and query words
///
/// Keys starting with `?` become query words (`?name=value`), everything
/// else becomes `=key=value`.
pub fn argument_words(arguments: Option<&Value>) -> Result<Vec<String>> {
    let map = match arguments {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(RosgateError::Validation(
                "arguments must be an object".to_string(),
            ))
        }
    };

    map.iter()
        .map(|(key, value)| {
            let key = key.trim();
            if key.is_empty() || key == "?" {
                return Err(RosgateError::Validation("argument names must not be empty".to_string()));
            }
            let value = scalar(key, value)?;
            Ok(match key.strip_prefix('?') {
                Some(query) => format!("?{query}={value}"),
                None => format!("={key}={value}"),
            })
        })
        .collect()
}

fn scalar(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "yes" } else { "no" }.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(RosgateError::Validation(format!(
            "argument {key:?} must be a string, number or boolean"
        ))),
    }
}

/// PPP secret names: 3 to 64 of `A-Z a-z 0-9 . _ -`
pub fn check_secret_name(name: &str) -> Result<()> {
    let valid_len = (3..=64).contains(&name.len());
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if valid_len && valid_chars {
        Ok(())
    } else {
        Err(RosgateError::Validation(format!(
            "invalid secret name {name:?}: use 3-64 characters from A-Z, a-z, 0-9, '.', '_', '-'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whitelisted_reads_allowed() {
        for path in [
            "/interface/print",
            "/interface/ethernet/print",
            "/ip/address/print",
            "/system/resource/print",
            "/ip/hotspot/active/print",
            "/ppp/active/print",
            "/log/print",
            "/interface/getall",
        ] {
            check_run_command(path).unwrap();
        }
    }

    #[test]
    fn test_outside_whitelist_rejected() {
        for path in ["/system/reboot", "/ppp/secret/print", "/interfaces/print", "/user/print"] {
            assert!(
                matches!(check_run_command(path), Err(RosgateError::SafetyPolicy(_))),
                "{path}"
            );
        }
    }

    #[test]
    fn test_write_verbs_rejected_inside_whitelist() {
        for path in ["/interface/set", "/ip/address/add", "/ppp/active/remove", "/log"] {
            assert!(
                matches!(check_run_command(path), Err(RosgateError::SafetyPolicy(_))),
                "{path}"
            );
        }
    }

    #[test]
    fn test_malformed_path_is_validation() {
        assert!(matches!(check_run_command(""), Err(RosgateError::Validation(_))));
        assert!(matches!(check_run_command("interface/print"), Err(RosgateError::Validation(_))));
    }

    #[test]
    fn test_argument_words() {
        let args = json!({"?name": "ether1", ".proplist": "name,type", "count": 3, "detail": true});
        let words = argument_words(Some(&args)).unwrap();
        assert_eq!(
            words,
            vec!["?name=ether1", "=.proplist=name,type", "=count=3", "=detail=yes"]
        );
    }

    #[test]
    fn test_argument_words_rejects_nesting() {
        let args = json!({"x": {"y": 1}});
        assert!(matches!(argument_words(Some(&args)), Err(RosgateError::Validation(_))));
        assert!(matches!(argument_words(Some(&json!("x"))), Err(RosgateError::Validation(_))));
        assert!(argument_words(None).unwrap().is_empty());
    }

    #[test]
    fn test_secret_names() {
        check_secret_name("cliente.01_a-b").unwrap();
        assert!(check_secret_name("ab").is_err());
        assert!(check_secret_name(&"a".repeat(65)).is_err());
        assert!(check_secret_name("bad name").is_err());
        assert!(check_secret_name("josé").is_err());
        check_secret_name(&"a".repeat(64)).unwrap();
    }
}
