//! System clipboard backends.
//!
//! The primary backend pipes text into a clipboard command (configured, or
//! the first of `pbcopy`, `wl-copy`, `xclip`, `xsel` found on `PATH`). The
//! fallback prints the text between markers so it can be selected by hand.

use skills_core::clipboard::{Clipboard, ClipboardError};
use std::io::Write;
use std::process::{Command as ProcessCommand, Stdio};

/// Known clipboard commands, tried in order.
const CANDIDATES: [&[&str]; 4] = [
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
];

/// Pipes text to an external clipboard command.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    /// Parses a whitespace-separated command line.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Uses the configured command, or the first known one on `PATH`.
    pub fn detect(configured: Option<&str>) -> Option<Self> {
        if let Some(command) = configured {
            return Self::from_command_line(command);
        }

        CANDIDATES
            .iter()
            .find(|candidate| on_path(candidate[0]))
            .map(|candidate| Self {
                program: candidate[0].to_string(),
                args: candidate[1..].iter().map(|s| (*s).to_string()).collect(),
            })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

fn on_path(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

impl Clipboard for CommandClipboard {
    fn name(&self) -> &str {
        &self.program
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut child = ProcessCommand::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipboardError::Unavailable(format!("{}: {e}", self.program)))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;
        }

        let status = child
            .wait()
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;
        if !status.success() {
            return Err(ClipboardError::WriteFailed(format!(
                "{} exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

/// Stand-in used when no clipboard command exists.
#[derive(Debug, Default)]
pub struct MissingClipboard;

impl Clipboard for MissingClipboard {
    fn name(&self) -> &str {
        "none"
    }

    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable(
            "no clipboard command found".to_string(),
        ))
    }
}

/// Textual fallback: writes the text to a stream for manual selection.
#[derive(Debug)]
pub struct PrintClipboard<W> {
    out: W,
}

impl<W: Write> PrintClipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl PrintClipboard<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Clipboard for PrintClipboard<W> {
    fn name(&self) -> &str {
        "print"
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let write = |out: &mut W| -> std::io::Result<()> {
            writeln!(out, "----- copy below -----")?;
            out.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(out)?;
            }
            writeln!(out, "----- copy above -----")?;
            out.flush()
        };
        write(&mut self.out).map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }
}
