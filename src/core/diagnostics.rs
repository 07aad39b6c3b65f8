//! # Diagnostics
//!
//! Maps interpreter stderr back onto the script buffer.
//!
//! A diagnostic line starts with the script path exactly as it was passed to
//! the interpreter, followed by `:`, then `line:column` (both 1-based):
//!
//! ```text
//! scratch.kts:3:9: error: unresolved reference: printn
//! └─ marker ─┘└┬┘
//!             location
//! ```
//!
//! Everything else in stderr is passed through verbatim.

use log::warn;
use std::fmt;
use std::path::Path;

/// 1-based source location reported by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The `<script path>:` prefix that identifies diagnostic lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMarker(String);

impl DiagnosticMarker {
    pub fn for_script(path: &Path) -> Self {
        Self(format!("{}:", path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One line of the output pane. `location` is set for activatable
/// diagnostic lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub location: Option<ErrorLocation>,
}

impl OutputLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
        }
    }
}

/// Parse the location following `marker` at the start of `line`.
///
/// Returns `None` when the marker is absent, when the `digits:digits` pair
/// is missing or malformed, or when either number is zero.
pub fn parse_location(line: &str, marker: &DiagnosticMarker) -> Option<ErrorLocation> {
    let rest = line.strip_prefix(marker.as_str())?;
    let (line_no, rest) = take_number(rest)?;
    let rest = rest.strip_prefix(':')?;
    let (column, _) = take_number(rest)?;

    (line_no > 0 && column > 0).then_some(ErrorLocation {
        line: line_no,
        column,
    })
}

/// Split a leading run of ASCII digits off `s`.
fn take_number(s: &str) -> Option<(usize, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Turn captured stderr into output lines, marking diagnostics.
///
/// Joining the returned texts with `\n` yields `stderr` unchanged.
pub fn format_error_output(stderr: &str, marker: &DiagnosticMarker) -> Vec<OutputLine> {
    stderr
        .split('\n')
        .map(|line| {
            let location = parse_location(line, marker);
            if location.is_none() && line.starts_with(marker.as_str()) {
                warn!("Diagnostic line without a usable location: {:?}", line);
            }
            OutputLine {
                text: line.to_string(),
                location,
            }
        })
        .collect()
}

/// Zero-based character offset of `location` in `text`.
///
/// Sums `chars + 1` over every line before `location.line`, then adds
/// `column - 1`. The result is clamped to the buffer length.
pub fn caret_offset(text: &str, location: ErrorLocation) -> usize {
    let preceding: usize = text
        .split('\n')
        .take(location.line.saturating_sub(1))
        .map(|line| line.chars().count() + 1)
        .sum();
    let offset = preceding + location.column.saturating_sub(1);
    offset.min(text.chars().count())
}
