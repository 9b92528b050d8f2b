//! Formatting helpers for messages printed by the commands.
//!
//! All helpers take the writer explicitly so commands can be tested against
//! in-memory buffers.

use std::io::{self, Write};

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use crate::ui::theme::ThemeEntry;

/// Writes `msg` on its own line, prefixed with the entry's label.
pub fn print_message<W: Write>(writer: &mut W, entry: ThemeEntry, msg: &str, supports_color: bool) -> io::Result<()> {
    let label = entry.label();
    let line = if label.is_empty() {
        msg.to_string()
    } else {
        format!("{label:>5}  {msg}")
    };
    if supports_color {
        writeln!(writer, "{}", line.color(entry.color()))
    } else {
        writeln!(writer, "{line}")
    }
}

/// Prints to stderr, colored when stderr is a terminal.
pub fn eprint_message(entry: ThemeEntry, msg: impl AsRef<str>) {
    let mut stderr = io::stderr();
    let supports_color = stderr.is_terminal();
    let _ = print_message(&mut stderr, entry, msg.as_ref(), supports_color);
}

pub fn info_msg(msg: impl AsRef<str>) {
    eprint_message(ThemeEntry::Info, msg);
}

pub fn error_msg(msg: impl AsRef<str>) {
    eprint_message(ThemeEntry::Error, msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_has_label() {
        let mut out = Vec::new();
        print_message(&mut out, ThemeEntry::Success, "it works", false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), " pass  it works\n");
    }

    #[test]
    fn test_colored_output_has_escape_codes() {
        let mut out = Vec::new();
        print_message(&mut out, ThemeEntry::Error, "broken", true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\u{1b}["));
        assert!(text.contains("FAIL  broken"));
    }

    #[test]
    fn test_header_has_no_label() {
        let mut out = Vec::new();
        print_message(&mut out, ThemeEntry::Header, "Providers", false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Providers\n");
    }
}
