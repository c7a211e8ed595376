//! Blocking operator input
//!
//! Only the startup username prompt reads stdin synchronously; once the
//! session is up, lines flow through the async command loop instead.

use std::io::{self, BufRead};

/// Read one line from stdin and return it trimmed
///
/// A blank line comes back as an empty string. End of input before any line
/// is a hard error: startup cannot proceed without an operator.
pub fn read_trimmed_line() -> io::Result<String> {
    let mut line = String::new();
    let bytes = io::stdin().lock().read_line(&mut line)?;
    if bytes == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input stream closed before a line was read",
        ));
    }
    Ok(line.trim().to_string())
}
