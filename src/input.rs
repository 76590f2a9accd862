//! Positional argument decoding.
//!
//! Arguments are `<connection-info> <sql> [bind-arg ...]`. In the default
//! base64 mode each one is decoded before use, which lets SQL containing
//! quotes, newlines or shell metacharacters travel safely through a shell.

use crate::config::ArgEncoding;
use crate::error::{CliError, CliResult};
use crate::models::QuerySpec;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::debug;

/// Minimum number of positional arguments (connection info and SQL).
pub const MIN_ARGS: usize = 2;

/// Usage text printed when too few arguments are given.
pub const USAGE: &str = "usage: db-json-query \
$(base64 <<< '{\"username\":\"root\",\"password\":\"\",\"host\":\"localhost\",\"port\":3306}') \
$(base64 <<< SQL) [$(base64 <<< arg1) $(base64 <<< arg2) $(base64 <<< arg3) ...]\n\
       db-json-query --encoding raw \
'{\"username\":\"root\",\"host\":\"localhost\",\"port\":3306}' 'SELECT ? AS x' 5";

/// Plain-text arguments after transport decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedArgs {
    /// JSON connection payload
    pub connection_info: String,
    pub query: QuerySpec,
}

/// Decode the raw positional arguments.
pub fn decode_args(raw: &[String], encoding: ArgEncoding) -> CliResult<DecodedArgs> {
    if raw.len() < MIN_ARGS {
        return Err(CliError::usage(MIN_ARGS, raw.len()));
    }

    let mut decoded = raw
        .iter()
        .enumerate()
        .map(|(position, arg)| decode_arg(position, arg, encoding))
        .collect::<CliResult<Vec<String>>>()?
        .into_iter();

    debug!(
        encoding = %encoding,
        args = raw.len(),
        "Decoded positional arguments"
    );

    // Length checked above
    let connection_info = decoded.next().unwrap_or_default();
    let sql = decoded.next().unwrap_or_default();

    Ok(DecodedArgs {
        connection_info,
        query: QuerySpec {
            sql,
            params: decoded.collect(),
        },
    })
}

/// Decode a single argument. `position` is only used in error messages.
pub fn decode_arg(position: usize, arg: &str, encoding: ArgEncoding) -> CliResult<String> {
    match encoding {
        ArgEncoding::Raw => Ok(arg.to_string()),
        ArgEncoding::Base64 => {
            let bytes = STANDARD
                .decode(arg)
                .map_err(|e| CliError::input_decode(position, format!("invalid base64: {e}")))?;
            String::from_utf8(bytes).map_err(|e| {
                CliError::input_decode(position, format!("decoded value is not UTF-8: {e}"))
            })
        }
    }
}

/// Encode a plain argument for the base64 transport.
pub fn encode_arg(plain: &str) -> String {
    STANDARD.encode(plain.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_too_few_args() {
        for raw in [args(&[]), args(&["e30="])] {
            let err = decode_args(&raw, ArgEncoding::Base64).unwrap_err();
            assert!(matches!(err, CliError::Usage { expected: 2, .. }));
        }
    }

    #[test]
    fn test_base64_args() {
        let raw = vec![
            encode_arg(r#"{"username":"root"}"#),
            encode_arg("SELECT ? AS x, ? AS y"),
            encode_arg("5"),
            encode_arg("it's \"quoted\""),
        ];
        let decoded = decode_args(&raw, ArgEncoding::Base64).unwrap();
        assert_eq!(decoded.connection_info, r#"{"username":"root"}"#);
        assert_eq!(decoded.query.sql, "SELECT ? AS x, ? AS y");
        assert_eq!(decoded.query.params, vec!["5", "it's \"quoted\""]);
    }

    #[test]
    fn test_base64_keeps_trailing_newline() {
        // `base64 <<< SQL` encodes the here-string's trailing newline
        let decoded = decode_arg(1, "U0VMRUNUIDEK", ArgEncoding::Base64).unwrap();
        assert_eq!(decoded, "SELECT 1\n");
    }

    #[test]
    fn test_round_trip_utf8() {
        for plain in ["", "héllo wörld", "中文测试", "tab\there\nnewline", "emoji 🎉"] {
            let decoded = decode_arg(0, &encode_arg(plain), ArgEncoding::Base64).unwrap();
            assert_eq!(decoded.as_bytes(), plain.as_bytes());
        }
    }

    #[test]
    fn test_invalid_base64_reports_position() {
        let raw = args(&["e30=", "not base64!"]);
        let err = decode_args(&raw, ArgEncoding::Base64).unwrap_err();
        match err {
            CliError::InputDecode { position, .. } => assert_eq!(position, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_utf8_payload_rejected() {
        // 0xFF 0xFE
        let err = decode_arg(2, "//4=", ArgEncoding::Base64).unwrap_err();
        assert!(err.to_string().contains("not UTF-8"));
    }

    #[test]
    fn test_raw_args_bind_every_trailing_value() {
        let raw = args(&["{}", "SELECT ?, ?, ?", "1", "two words", ""]);
        let decoded = decode_args(&raw, ArgEncoding::Raw).unwrap();
        assert_eq!(decoded.query.sql, "SELECT ?, ?, ?");
        assert_eq!(decoded.query.params, vec!["1", "two words", ""]);
    }

    #[test]
    fn test_raw_mode_does_not_decode() {
        let decoded = decode_arg(0, "e30=", ArgEncoding::Raw).unwrap();
        assert_eq!(decoded, "e30=");
    }

    #[test]
    fn test_usage_mentions_base64() {
        assert!(USAGE.contains("base64 <<<"));
        assert!(USAGE.contains("\"port\":3306"));
    }
}
