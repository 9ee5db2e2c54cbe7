/*!
 * Position-stable multi-point insertion into script text.
 *
 * Anchors are line numbers of the *original* script. Insertions are applied
 * from the highest anchor to the lowest so that every anchor still refers to
 * unmoved lines when its turn comes.
 */

use std::collections::BTreeMap;

use log::debug;

use crate::errors::InjectionError;
use crate::script::cues::PlannedCue;

/// How one line is terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEnding {
    Lf,
    CrLf,
    /// Last line of a text without a final terminator
    None,
}

impl LineEnding {
    fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::None => "",
        }
    }
}

/// Script text split into lines, remembering how each line was terminated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLines {
    /// Line contents without their terminators
    pub lines: Vec<String>,
    /// Terminator of each line, parallel to `lines`
    endings: Vec<LineEnding>,
}

impl SourceLines {
    /// Split text into lines without normalizing any content
    pub fn split(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut endings = Vec::new();

        for piece in text.split_inclusive('\n') {
            let (content, ending) = if let Some(content) = piece.strip_suffix("\r\n") {
                (content, LineEnding::CrLf)
            } else if let Some(content) = piece.strip_suffix('\n') {
                (content, LineEnding::Lf)
            } else {
                (piece, LineEnding::None)
            };
            lines.push(content.to_string());
            endings.push(ending);
        }

        Self { lines, endings }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Most common terminator in the text; `\n` when there is none or a tie
    fn dominant_ending(&self) -> LineEnding {
        let crlf = self.endings.iter().filter(|e| **e == LineEnding::CrLf).count();
        let lf = self.endings.iter().filter(|e| **e == LineEnding::Lf).count();
        if crlf > lf { LineEnding::CrLf } else { LineEnding::Lf }
    }

    /// Insert lines after the 1-based `anchor`, terminated like their neighbour
    ///
    /// When the anchor is an unterminated last line, it receives the
    /// dominant terminator and the last inserted line stays unterminated.
    fn insert_after(&mut self, anchor: usize, new_lines: Vec<String>) {
        if new_lines.is_empty() {
            return;
        }

        let neighbour = match anchor {
            0 => self.dominant_ending(),
            _ => self.endings[anchor - 1],
        };
        let mut new_endings = vec![neighbour; new_lines.len()];
        if neighbour == LineEnding::None {
            let separator = self.dominant_ending();
            self.endings[anchor - 1] = separator;
            new_endings.fill(separator);
            if let Some(last) = new_endings.last_mut() {
                *last = LineEnding::None;
            }
        }

        self.lines.splice(anchor..anchor, new_lines);
        self.endings.splice(anchor..anchor, new_endings);
    }

    /// Re-join into text; the exact inverse of [`SourceLines::split`]
    pub fn join(&self) -> String {
        self.lines
            .iter()
            .zip(&self.endings)
            .map(|(line, ending)| format!("{}{}", line, ending.as_str()))
            .collect()
    }
}

/// Insert groups of lines after 1-based anchor lines
///
/// Entries sharing an anchor are emitted together in the order given. The
/// result does not depend on the order of distinct anchors in `insertions`.
///
/// # Errors
/// * `InjectionError::AnchorOutOfRange` if an anchor is past the last line
pub fn insert_after_lines<'a, I>(source: &mut SourceLines, insertions: I) -> Result<usize, InjectionError>
where
    I: IntoIterator<Item = (usize, &'a [String])>,
{
    let mut grouped: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (anchor, lines) in insertions {
        grouped.entry(anchor).or_default().extend(lines.iter().cloned());
    }

    let line_count = source.len();
    if let Some((&anchor, _)) = grouped.last_key_value() {
        if anchor > line_count {
            return Err(InjectionError::AnchorOutOfRange { anchor, line_count });
        }
    }

    let mut inserted = 0;
    // Highest anchor first: lines above it have not moved yet
    for (anchor, lines) in grouped.into_iter().rev() {
        inserted += lines.len();
        source.insert_after(anchor, lines);
    }

    Ok(inserted)
}

/// Apply an insertion plan to script text
pub fn apply_plan(script: &str, plan: &[PlannedCue]) -> Result<String, InjectionError> {
    if plan.is_empty() {
        return Ok(script.to_string());
    }

    let mut source = SourceLines::split(script);
    let inserted = insert_after_lines(
        &mut source,
        plan.iter().map(|cue| (cue.anchor_line, cue.lines.as_slice())),
    )?;

    debug!("Inserted {} line(s) at {} anchor(s)", inserted, plan.len());

    Ok(source.join())
}
