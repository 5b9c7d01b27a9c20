// fieldscrub/src/ui/output_format.rs
//! Prefixed status messages for stderr.

use std::io::{self, Write};

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warn,
    Error,
}

impl MessageKind {
    fn prefix(self) -> &'static str {
        match self {
            MessageKind::Info => "[INFO]",
            MessageKind::Success => "[OK]",
            MessageKind::Warn => "[WARN]",
            MessageKind::Error => "[ERROR]",
        }
    }
}

/// Writes `[PREFIX] message`, colouring the prefix when `supports_color` is set.
pub fn print_message<W: Write + ?Sized>(
    writer: &mut W,
    kind: MessageKind,
    message: &str,
    supports_color: bool,
) -> io::Result<()> {
    let prefix = kind.prefix();
    if !supports_color {
        return writeln!(writer, "{} {}", prefix, message);
    }
    match kind {
        MessageKind::Info => writeln!(writer, "{} {}", prefix.cyan(), message),
        MessageKind::Success => writeln!(writer, "{} {}", prefix.green(), message),
        MessageKind::Warn => writeln!(writer, "{} {}", prefix.yellow(), message),
        MessageKind::Error => writeln!(writer, "{} {}", prefix.red().bold(), message),
    }
}

/// Prints a message to stderr unless `quiet` is set.
pub fn stderr_msg(kind: MessageKind, message: impl AsRef<str>, quiet: bool) {
    if quiet {
        return;
    }
    let stderr = io::stderr();
    let supports_color = stderr.is_terminal();
    let _ = print_message(&mut stderr.lock(), kind, message.as_ref(), supports_color);
}
