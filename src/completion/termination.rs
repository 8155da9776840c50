//! Termination marker detection.
//!
//! The assistant is asked to end the final part of a multipart answer with
//! a short sentinel. A reply is terminal when it is exactly a marker, or
//! when it ends with a space or line break followed by a marker. Matching
//! is case-sensitive; the marker set already lists both capitalizations.

/// Sentinels that end a multipart sequence, in match order.
pub const TERMINATION_MARKERS: [&str; 4] = ["Done", "Done.", "done", "done."];

/// Outcome of inspecting one assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination<'a> {
    /// No marker; the full text is content.
    Continue,
    /// A marker ended the sequence. `residue` is the content before it,
    /// right-trimmed, and is empty when the turn was only the marker.
    Terminal { residue: &'a str },
}

impl<'a> Termination<'a> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Termination::Terminal { .. })
    }
}

/// Inspect trimmed assistant text for a termination marker.
///
/// Exact matches are checked before suffix matches.
pub fn detect(text: &str) -> Termination<'_> {
    if is_marker(text) {
        return Termination::Terminal { residue: "" };
    }
    match strip_marker_suffix(text) {
        Some(residue) => Termination::Terminal { residue },
        None => Termination::Continue,
    }
}

/// Whether the text is exactly one of the termination markers.
pub fn is_marker(text: &str) -> bool {
    TERMINATION_MARKERS.contains(&text)
}

/// The user-visible part of a turn: the text with any trailing marker
/// removed.
pub fn residue(text: &str) -> &str {
    match detect(text) {
        Termination::Terminal { residue } => residue,
        Termination::Continue => text,
    }
}

fn strip_marker_suffix(text: &str) -> Option<&str> {
    TERMINATION_MARKERS.iter().find_map(|marker| {
        let head = text.strip_suffix(marker)?;
        head.ends_with([' ', '\n']).then(|| head.trim_end())
    })
}
