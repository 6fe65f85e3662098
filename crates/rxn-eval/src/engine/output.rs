use crate::error::EvalError;
use crate::types::MatchRecord;
use serde::Deserialize;
use serde_json::Value;

/// One line of bridge output: `{"ok": ...}` or `{"error": "..."}`.
#[derive(Deserialize)]
struct BridgeReply {
    #[serde(default)]
    ok: Value,
    error: Option<String>,
}

/// The chemistry package may log to stdout while loading its datasets, so
/// only the last JSON object line is the reply.
fn parse_reply(stdout: &str) -> Result<Value, EvalError> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with('{'))
        .ok_or_else(|| EvalError::Parse("no JSON reply on stdout".into()))?;

    let reply: BridgeReply =
        serde_json::from_str(line).map_err(|e| EvalError::Parse(e.to_string()))?;

    match reply.error {
        Some(message) => Err(EvalError::Engine(message)),
        None => Ok(reply.ok),
    }
}

/// A formula reply is a single id, `null`, or a list whose first entry wins.
pub fn parse_formula_output(stdout: &str) -> Result<Option<MatchRecord>, EvalError> {
    match parse_reply(stdout)? {
        Value::Null => Ok(None),
        Value::String(id) if id.is_empty() => Ok(None),
        Value::String(id) => Ok(Some(MatchRecord::new(id))),
        Value::Array(ids) => Ok(ids
            .into_iter()
            .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(MatchRecord::new))),
        other => Err(EvalError::Parse(format!(
            "expected formula id, got {other}"
        ))),
    }
}

/// An operator reply is a list of ids (or `null` for none). Duplicates are
/// dropped, first occurrence kept.
pub fn parse_operator_output(stdout: &str) -> Result<Vec<MatchRecord>, EvalError> {
    let ids = match parse_reply(stdout)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(ids) => ids,
        other => {
            return Err(EvalError::Parse(format!(
                "expected list of operator ids, got {other}"
            )))
        }
    };

    let mut records: Vec<MatchRecord> = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(id) = id.as_str() else {
            return Err(EvalError::Parse(format!("operator id is not a string: {id}")));
        };
        if !records.iter().any(|r| r.match_id == id) {
            records.push(MatchRecord::new(id));
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_single_id() {
        let out = parse_formula_output(r#"{"ok": "EVODEX.1-F13"}"#).unwrap();
        assert_eq!(out, Some(MatchRecord::new("EVODEX.1-F13")));
    }

    #[test]
    fn test_formula_null_and_empty_list() {
        assert_eq!(parse_formula_output(r#"{"ok": null}"#).unwrap(), None);
        assert_eq!(parse_formula_output(r#"{"ok": []}"#).unwrap(), None);
    }

    #[test]
    fn test_formula_list_takes_first() {
        let out = parse_formula_output(r#"{"ok": ["EVODEX.1-F2", "EVODEX.1-F9"]}"#).unwrap();
        assert_eq!(out, Some(MatchRecord::new("EVODEX.1-F2")));
    }

    #[test]
    fn test_reply_after_loader_noise() {
        let stdout = "Loading EVODEX-E data...\nloaded 1200 operators\n{\"ok\": [\"EVODEX.1-E2\"]}\n";
        let out = parse_operator_output(stdout).unwrap();
        assert_eq!(out, vec![MatchRecord::new("EVODEX.1-E2")]);
    }

    #[test]
    fn test_operators_dedup_keeps_order() {
        let out =
            parse_operator_output(r#"{"ok": ["EVODEX.1-C5", "EVODEX.1-C1", "EVODEX.1-C5"]}"#)
                .unwrap();
        assert_eq!(
            out,
            vec![MatchRecord::new("EVODEX.1-C5"), MatchRecord::new("EVODEX.1-C1")]
        );
    }

    #[test]
    fn test_engine_error_is_reported() {
        let err = parse_operator_output(r#"{"error": "ValueError: bad SMILES"}"#).unwrap_err();
        assert!(matches!(err, EvalError::Engine(ref m) if m.contains("bad SMILES")));
    }

    #[test]
    fn test_no_json_is_parse_error() {
        assert!(matches!(
            parse_formula_output("Traceback (most recent call last):"),
            Err(EvalError::Parse(_))
        ));
    }

    #[test]
    fn test_wrong_shape_is_parse_error() {
        assert!(matches!(
            parse_operator_output(r#"{"ok": 3}"#),
            Err(EvalError::Parse(_))
        ));
    }
}
