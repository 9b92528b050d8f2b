//! Colors used for the CLI's own messages.
//!
//! Each kind of message maps to one ANSI foreground color. Colors are only
//! applied when the destination stream is a terminal.

use owo_colors::AnsiColors;

/// The different logical parts of the output that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeEntry {
    /// Section titles.
    Header,
    /// A passing check.
    Success,
    /// General informational messages.
    Info,
    /// Errors and failing checks.
    Error,
}

impl ThemeEntry {
    /// The foreground color for this entry.
    pub fn color(self) -> AnsiColors {
        match self {
            ThemeEntry::Header => AnsiColors::BrightWhite,
            ThemeEntry::Success => AnsiColors::Green,
            ThemeEntry::Info => AnsiColors::Cyan,
            ThemeEntry::Error => AnsiColors::Red,
        }
    }

    /// The tag printed before a message of this kind.
    pub fn label(self) -> &'static str {
        match self {
            ThemeEntry::Header => "",
            ThemeEntry::Success => "pass",
            ThemeEntry::Info => "info",
            ThemeEntry::Error => "FAIL",
        }
    }
}
