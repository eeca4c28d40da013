//! The single startup prompt.

use std::io::{self, BufRead, Write};

pub const PROMPT: &str = "\nEnter the function f(x): ";

/// Print the prompt to `out` and read one line from `input`.
///
/// The trailing newline is stripped. End of input yields an empty string, which the
/// expression compiler rejects.
pub fn read_function<R: BufRead, W: Write>(mut input: R, mut out: W) -> io::Result<String> {
    out.write_all(PROMPT.as_bytes())?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
