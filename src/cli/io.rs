//! JSON line I/O for the CLI
//!
//! - Input: one JSON value per line; blank lines are skipped
//! - Output: one JSON object per line, `{"status": "ok", "data": ...}` or
//!   `{"status": "error", "code": ..., "message": ...}`
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Reads JSON values line by line, each with its 1-based line number.
///
/// A read failure ends the stream with `Err`; a line that is not JSON is
/// reported in place so the caller can answer it and go on.
pub fn read_requests<R: BufRead>(
    input: R,
) -> impl Iterator<Item = CliResult<(usize, Result<Value, serde_json::Error>)>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|(i, line)| {
            let line = line.map_err(CliError::from)?;
            Ok((i + 1, serde_json::from_str(&line)))
        })
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data
    });
    write_line(out, &response)
}

/// Write an error response. `details` is attached when present.
pub fn write_error<W: Write>(
    out: &mut W,
    code: &str,
    message: &str,
    details: Option<Value>,
) -> CliResult<()> {
    let mut response = json!({
        "status": "error",
        "code": code,
        "message": message
    });
    if let Some(details) = details {
        response["details"] = details;
    }
    write_line(out, &response)
}

/// Write plain text followed by a newline
pub fn write_text<W: Write>(out: &mut W, text: &str) -> CliResult<()> {
    writeln!(out, "{}", text)?;
    out.flush()?;
    Ok(())
}

fn write_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_requests_skips_blank_lines() {
        let input = Cursor::new("{\"a\":1}\n\n  \nnot json\n[1]\n");
        let items: Vec<_> = read_requests(input).map(Result::unwrap).collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].0, 1);
        assert!(items[0].1.is_ok());
        assert_eq!(items[1].0, 4);
        assert!(items[1].1.is_err());
        assert_eq!(items[2].0, 5);
    }

    #[test]
    fn test_write_response_shape() {
        let mut out = Vec::new();
        write_response(&mut out, json!({"valid": true})).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert_eq!(line, "{\"status\":\"ok\",\"data\":{\"valid\":true}}\n");
    }

    #[test]
    fn test_write_error_with_details() {
        let mut out = Vec::new();
        write_error(&mut out, "X", "bad", Some(json!({"path": "a"}))).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["code"], "X");
        assert_eq!(parsed["details"]["path"], "a");
    }
}
