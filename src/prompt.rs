//! Interactive start-up questions
//!
//! Each question shows the current value; pressing enter keeps it.

use std::io::{BufRead, Write};

use crate::errors::{RecorderError, Result};

/// Ask `question` on `output` and read one answer from `input`.
///
/// A blank answer or a closed input keeps `default`. Anything else replaces it.
pub fn prompt_directory<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: &str,
) -> Result<String> {
    let io_err = |e: std::io::Error| RecorderError::Backend(format!("prompt failed: {e}"));

    write!(output, "{} [{}]: ", question, default).map_err(io_err)?;
    output.flush().map_err(io_err)?;

    let mut line = String::new();
    if input.read_line(&mut line).map_err(io_err)? == 0 {
        writeln!(output).map_err(io_err)?;
        return Ok(default.to_string());
    }

    let answer = line.trim();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        log::debug!("'{}' answered with '{}'", question, answer);
        Ok(answer.to_string())
    }
}
