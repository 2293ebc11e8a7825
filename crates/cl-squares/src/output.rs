//! Formatting of the result line.

use std::fmt::Write as _;
use std::io::{self, Write};

/// Render `values` in the shortest decimal form (`4`, not `4.0`), each
/// followed by a single space.
pub fn format_values(values: &[f32]) -> String {
    let mut line = String::with_capacity(values.len() * 4);
    for v in values {
        let _ = write!(line, "{} ", v);
    }
    line
}

/// Write the result line, newline-terminated, and flush.
pub fn write_values<W: Write>(mut out: W, values: &[f32]) -> io::Result<()> {
    writeln!(out, "{}", format_values(values))?;
    out.flush()
}
