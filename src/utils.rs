//! Utility functions
use std::io::{BufRead, Write};

use crate::errors::{GitMoverError, GitMoverErrorKind};

/// Write `question` to `output`, then read one line of `answer`
///
/// The question is flushed before reading so it shows up even without a newline.
pub(crate) fn input<R: BufRead, W: Write>(
    question: &str,
    answer: &mut R,
    output: &mut W,
) -> Result<String, GitMoverError> {
    let io_error = |e: std::io::Error| GitMoverError::with_source(GitMoverErrorKind::Io, e);
    write!(output, "{question}").map_err(io_error)?;
    output.flush().map_err(io_error)?;
    let mut s = String::new();
    answer.read_line(&mut s).map_err(io_error)?;
    if let Some('\n') = s.chars().next_back() {
        s.pop();
    }
    if let Some('\r') = s.chars().next_back() {
        s.pop();
    }
    Ok(s)
}

/// Only an explicit `y` or `Y` accepts, an empty answer refuses
pub(crate) fn is_affirmative(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("y")
}
