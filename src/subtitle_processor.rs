use std::fmt;
use log::debug;

// @module: SRT parsing and serialization

// @const: Marker of a timing line
const TIMING_ARROW: &str = "-->";

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Cue index exactly as written in the source file
    pub id: String,

    // @field: Raw timing line, kept verbatim
    pub timestamp: String,

    // @field: Dialogue, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleEntry {
            id: id.into(),
            timestamp: timestamp.into(),
            text: text.into(),
        }
    }

    /// Copy of this entry carrying different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        SubtitleEntry {
            id: self.id.clone(),
            timestamp: self.timestamp.clone(),
            text: text.into(),
        }
    }

    // @parses: One block of lines; None when the block is too short to be a cue
    fn from_block(block: &str) -> Option<Self> {
        let lines: Vec<&str> = block.split('\n').collect();
        if lines.len() < 3 {
            return None;
        }

        Some(SubtitleEntry {
            id: lines[0].trim().to_string(),
            timestamp: lines[1].trim().to_string(),
            text: lines[2..].join("\n").trim().to_string(),
        })
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.id, self.timestamp, self.text)
    }
}

/// Clean up cue text so that it survives a serialize/parse round trip
///
/// Line endings are normalized, blank and whitespace-only lines are removed,
/// trailing whitespace is stripped from each line and the result is trimmed.
pub fn normalize_cue_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// @checks: Line `index` (after any whitespace-only lines) is an id followed by a timing line
fn starts_cue(lines: &[&str], index: usize) -> bool {
    let next = lines[index.min(lines.len())..]
        .iter()
        .position(|line| !line.trim().is_empty())
        .map(|offset| index + offset);

    match next {
        Some(id_line) => lines.get(id_line + 1).is_some_and(|line| line.contains(TIMING_ARROW)),
        None => true,
    }
}

// @splits: Normalized SRT text into raw blocks
//
// Empty lines always end a block. A whitespace-only line ends a block only
// when the next non-blank line starts a new cue; otherwise it stays part of
// the dialogue.
fn split_blocks(content: &str) -> Vec<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for (index, &line) in lines.iter().enumerate() {
        let separates = line.is_empty() || (line.trim().is_empty() && starts_cue(&lines, index + 1));

        if separates {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else if !(current.is_empty() && line.trim().is_empty()) {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

/// Parse SRT text into cues
///
/// Line endings are normalized and the whole input is trimmed before it is
/// split into blocks on blank lines. Blocks with fewer than three lines are
/// dropped without error.
pub fn parse_srt(content: &str) -> Vec<SubtitleEntry> {
    let normalized = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let normalized = normalized.trim();

    let mut dropped = 0usize;
    let entries: Vec<SubtitleEntry> = split_blocks(normalized)
        .iter()
        .filter_map(|block| {
            let entry = SubtitleEntry::from_block(block);
            if entry.is_none() && !block.trim().is_empty() {
                dropped += 1;
            }
            entry
        })
        .collect();

    if dropped > 0 {
        debug!("Skipped {} malformed subtitle block(s)", dropped);
    }

    entries
}

/// Render cues back to SRT text, one blank line between cues
pub fn serialize_srt(entries: &[SubtitleEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Ordered collection of subtitle cues
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleCollection {
    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    pub fn new(entries: Vec<SubtitleEntry>) -> Self {
        SubtitleCollection { entries }
    }

    /// Parse SRT format string into a collection
    pub fn parse_srt_string(content: &str) -> Self {
        Self::new(parse_srt(content))
    }

    /// Serialize the collection to SRT text
    pub fn to_srt_string(&self) -> String {
        serialize_srt(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_srt_string())
    }
}
