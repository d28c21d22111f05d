use std::fs;
use std::path::Path;

/// Extract the solve time from an info artifact.
///
/// The header block runs up to the first blank line. Its last line carries the
/// timing record, whose second whitespace-delimited token is the number we
/// want. Anything else (no header, short line, non-numeric token) is `None`.
pub fn parse_solve_time(text: &str) -> Option<f64> {
    let header_last = text
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .last()?;
    header_last.split_whitespace().nth(1)?.parse::<f64>().ok()
}

/// [`parse_solve_time`] on a file; a missing or unreadable file is `None`.
pub fn read_solve_time(path: &Path) -> Option<f64> {
    fs::read_to_string(path)
        .ok()
        .as_deref()
        .and_then(parse_solve_time)
}
