//! lpac output protocol
//!
//! lpac writes one JSON message per line on stdout:
//!
//! ```text
//! {"type":"progress","payload":{"code":0,"message":"es10c_get_euicc_info2","data":null}}
//! {"type":"lpa","payload":{"code":0,"message":"success","data":{...}}}
//! ```
//!
//! `progress` messages report steps of a running command. The final `lpa`
//! message carries the result: `code == 0` means success and `data` is the
//! command's output.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{LpacError, Result};

/// One line of lpac output
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    /// Message kind (`lpa`, `progress`, `driver`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Message body
    pub payload: Payload,
}

/// Body of an lpac message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Payload {
    /// Result or step code
    pub code: i64,
    /// Short message or step name
    #[serde(default)]
    pub message: String,
    /// Command output or error detail
    #[serde(default)]
    pub data: Value,
}

/// Kind of the message carrying a command's result
pub const RESULT_KIND: &str = "lpa";

/// Kind of the messages reporting intermediate steps
pub const PROGRESS_KIND: &str = "progress";

/// Parse one output line
pub fn parse_line(line: &str) -> Result<Message> {
    serde_json::from_str(line).map_err(|source| LpacError::Json {
        line: line.to_string(),
        source,
    })
}

/// Extract the result of a command from its complete stdout
///
/// Returns `Ok(None)` when no result line was printed.
pub fn parse_output(stdout: &str) -> Result<Option<Value>> {
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let message = parse_line(line)?;
        match message.kind.as_str() {
            RESULT_KIND => return into_result(message.payload).map(Some),
            PROGRESS_KIND => {
                debug!(step = %message.payload.message, "lpac progress");
            }
            other => trace!(kind = other, "Ignoring lpac message"),
        }
    }
    Ok(None)
}

fn into_result(payload: Payload) -> Result<Value> {
    if payload.code == 0 {
        Ok(payload.data)
    } else {
        Err(LpacError::Lpa {
            code: payload.code,
            message: payload.message,
            data: payload.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_after_progress() {
        let stdout = concat!(
            r#"{"type":"progress","payload":{"code":0,"message":"es10c_get_profiles_info","data":null}}"#,
            "\n",
            r#"{"type":"lpa","payload":{"code":0,"message":"success","data":[{"iccid":"8944000000000000001","profileState":"enabled"}]}}"#,
            "\n",
        );
        let data = parse_output(stdout).unwrap().unwrap();
        assert_eq!(data[0]["profileState"], json!("enabled"));
    }

    #[test]
    fn test_error_code() {
        let stdout = r#"{"type":"lpa","payload":{"code":-1,"message":"es10c_get_euicc_info2","data":"SW6A82"}}"#;
        let err = parse_output(stdout).unwrap_err();
        assert!(err.is_card_error());
        match err {
            LpacError::Lpa { code, message, data } => {
                assert_eq!(code, -1);
                assert_eq!(message, "es10c_get_euicc_info2");
                assert_eq!(data, json!("SW6A82"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_result() {
        let stdout = concat!(
            r#"{"type":"progress","payload":{"code":0,"message":"es10b_list_notification"}}"#,
            "\n\n",
        );
        assert_eq!(parse_output(stdout).unwrap(), None);
        assert_eq!(parse_output("").unwrap(), None);
    }

    #[test]
    fn test_missing_data_is_null() {
        let stdout = r#"{"type":"lpa","payload":{"code":0,"message":"success"}}"#;
        assert_eq!(parse_output(stdout).unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_malformed_line() {
        let err = parse_output("SCardEstablishContext failed\n").unwrap_err();
        assert!(matches!(err, LpacError::Json { ref line, .. } if line == "SCardEstablishContext failed"));
    }

    #[test]
    fn test_unknown_kind_is_ignored() {
        let stdout = concat!(
            r#"{"type":"driver","payload":{"code":0,"message":"apdu_list","data":[]}}"#,
            "\n",
            r#"{"type":"lpa","payload":{"code":0,"message":"success","data":"v2.2.1"}}"#,
        );
        assert_eq!(parse_output(stdout).unwrap(), Some(json!("v2.2.1")));
    }
}
