//! Small string and time helpers shared across the tool.

use chrono::Local;
use regex::Regex;

use crate::error::AppError;

/// The local time in classic ctime layout, e.g. `Tue Aug 25 14:03:02 2026`.
///
/// Used to stamp corrections files and run summaries. `%e` pads single-digit
/// days with a space, matching what ctime prints; there is no trailing
/// newline to strip.
pub fn current_time_string() -> String {
    Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}

/// Remove the first match of `pattern` from `s`.
///
/// If removing the match would empty the string (the pattern swallowed all of
/// it), the original string is returned instead; callers use this to derive
/// output names from input names, and an empty name is never useful.
pub fn strip_pattern(s: &str, pattern: &str) -> Result<String, AppError> {
    let re = Regex::new(pattern)
        .map_err(|e| AppError::new(2, format!("Invalid pattern '{pattern}': {e}")))?;
    let stripped = re.replacen(s, 1, "").into_owned();
    if stripped.is_empty() {
        Ok(s.to_string())
    } else {
        Ok(stripped)
    }
}
