//! Menu description parser
//!
//! Turns tab-indented text into a lazy stream of [`Entry`] values:
//!
//! ```text
//! Firefox<TAB>firefox
//! IMG:/usr/share/icons/term.png<TAB>Terminal<TAB>foot
//! Files
//! <TAB>Home<TAB>nautilus ~
//! <TAB>Recent<TAB>$ ls -t ~/Documents | head
//! ```
//!
//! Leading tabs give the nesting level, the first field is the label (or an
//! `IMG:` icon reference), the rest of the line is the output. An output
//! starting with `$` is a deferred command whose stdout becomes a submenu.

use std::io::{BufRead, Lines};

use crate::error::{Error, Result};

/// Prefix marking an icon reference instead of a label.
pub const ICON_PREFIX: &str = "IMG:";

/// Sigil marking a deferred command output.
pub const COMMAND_SIGIL: char = '$';

/// One parsed input line.
///
/// `output` is `None` when the line had no output field; the slice then
/// outputs its label (or, for icon-only lines, its icon reference). The label
/// is stored once, so there is nothing shared to free twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based line number in the stream, for diagnostics.
    pub line: usize,
    /// Nesting level, including any base offset.
    pub level: usize,
    pub label: Option<String>,
    pub icon: Option<String>,
    pub output: Option<String>,
    /// Output is a shell command producing a submenu.
    pub deferred: bool,
}

impl Entry {
    /// The value emitted when this entry is chosen.
    pub fn output(&self) -> &str {
        self.output
            .as_deref()
            .or(self.label.as_deref())
            .or(self.icon.as_deref())
            .unwrap_or_default()
    }
}

/// Parse a single line (without its terminator).
///
/// `offset` is added to the counted indentation; generated submenus are
/// parsed with the level of the menu they will hang below.
pub fn parse_line(text: &str, line: usize, offset: usize) -> Result<Entry> {
    let text = text.trim_end_matches(|c: char| c == '\n' || c == '\r');
    let rest = text.trim_start_matches('\t');
    let level = text.len() - rest.len() + offset;

    if rest.trim().is_empty() {
        return Err(Error::EmptyItem { line });
    }

    let (first, remainder) = split_field(rest);

    let (label, icon, output) = match first.strip_prefix(ICON_PREFIX) {
        Some(path) => {
            // icon lines: one more field is the output, two or more are label + output
            match remainder {
                Some(fields) => match split_field(fields) {
                    (label, Some(output)) => (Some(label.to_string()), Some(path.to_string()), Some(output)),
                    (output, None) => (None, Some(path.to_string()), Some(output)),
                },
                None => (None, Some(path.to_string()), None),
            }
        }
        None => (Some(first.to_string()), None, remainder),
    };

    let (output, deferred) = match output {
        Some(out) => match out.strip_prefix(COMMAND_SIGIL) {
            Some(command) => (Some(command.trim_start().to_string()), true),
            None => (Some(out.to_string()), false),
        },
        None => (None, false),
    };

    Ok(Entry {
        line,
        level,
        label,
        icon,
        output,
        deferred,
    })
}

/// Split off the first tab-delimited field; the remainder has its leading
/// tabs stripped and is `None` when empty.
fn split_field(s: &str) -> (&str, Option<&str>) {
    match s.split_once('\t') {
        Some((field, rest)) => {
            let rest = rest.trim_start_matches('\t');
            (field, (!rest.is_empty()).then_some(rest))
        }
        None => (s, None),
    }
}

/// Lazy, non-restartable entry stream over a line reader.
pub struct Entries<R> {
    lines: Lines<R>,
    line: usize,
    offset: usize,
}

impl<R: BufRead> Entries<R> {
    pub fn new(reader: R) -> Self {
        Self::with_offset(reader, 0)
    }

    /// Stream whose levels start at `offset` instead of zero.
    pub fn with_offset(reader: R, offset: usize) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            offset,
        }
    }
}

impl<R: BufRead> Iterator for Entries<R> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = match self.lines.next()? {
            Ok(text) => text,
            Err(e) => return Some(Err(e.into())),
        };
        self.line += 1;
        Some(parse_line(&text, self.line, self.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_label_outputs_itself() {
        let entry = parse_line("firefox", 1, 0).unwrap();
        assert_eq!(entry.level, 0);
        assert_eq!(entry.label.as_deref(), Some("firefox"));
        assert_eq!(entry.output, None);
        assert_eq!(entry.output(), "firefox");
        assert!(!entry.deferred);
    }

    #[test]
    fn test_explicit_output() {
        let entry = parse_line("Open\topen file.txt", 1, 0).unwrap();
        assert_eq!(entry.label.as_deref(), Some("Open"));
        assert_eq!(entry.output.as_deref(), Some("open file.txt"));
        assert_eq!(entry.output(), "open file.txt");
    }

    #[test]
    fn test_indentation_and_extra_tabs() {
        let entry = parse_line("\t\tTerm\t\t\tfoot -e htop\n", 3, 0).unwrap();
        assert_eq!(entry.level, 2);
        assert_eq!(entry.line, 3);
        assert_eq!(entry.label.as_deref(), Some("Term"));
        assert_eq!(entry.output(), "foot -e htop");
    }

    #[test]
    fn test_spaces_stay_in_label() {
        let entry = parse_line("Web Browser\tfirefox", 1, 0).unwrap();
        assert_eq!(entry.label.as_deref(), Some("Web Browser"));
    }

    #[test]
    fn test_icon_only_slice() {
        let entry = parse_line("IMG:/tmp/x.png\tgo", 1, 0).unwrap();
        assert_eq!(entry.label, None);
        assert_eq!(entry.icon.as_deref(), Some("/tmp/x.png"));
        assert_eq!(entry.output(), "go");
    }

    #[test]
    fn test_icon_with_label_and_output() {
        let entry = parse_line("IMG:term.png\tTerminal\tfoot", 1, 0).unwrap();
        assert_eq!(entry.label.as_deref(), Some("Terminal"));
        assert_eq!(entry.icon.as_deref(), Some("term.png"));
        assert_eq!(entry.output(), "foot");
    }

    #[test]
    fn test_bare_icon_outputs_reference() {
        let entry = parse_line("IMG:term.png", 1, 0).unwrap();
        assert_eq!(entry.label, None);
        assert_eq!(entry.output(), "term.png");
    }

    #[test]
    fn test_deferred_command() {
        let entry = parse_line("Recent\t$  ls -t | head", 1, 0).unwrap();
        assert!(entry.deferred);
        assert_eq!(entry.output(), "ls -t | head");
    }

    #[test]
    fn test_empty_lines_are_errors() {
        assert!(matches!(parse_line("", 4, 0), Err(Error::EmptyItem { line: 4 })));
        assert!(matches!(parse_line("\t\t", 2, 0), Err(Error::EmptyItem { line: 2 })));
        assert!(matches!(parse_line("\t  \r", 1, 0), Err(Error::EmptyItem { .. })));
    }

    #[test]
    fn test_stream_counts_lines_and_applies_offset() {
        let text = "a\n\tb\nc\n";
        let entries: Vec<Entry> = Entries::with_offset(text.as_bytes(), 2)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries.iter().map(|e| (e.line, e.level)).collect::<Vec<_>>(),
            vec![(1, 2), (2, 3), (3, 2)]
        );
    }
}
