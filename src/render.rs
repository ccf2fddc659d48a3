//! Output rendering for the chat surface.
//!
//! This module provides a trait-based rendering abstraction so the session
//! logic never touches stdout directly. The default implementation writes
//! plain text with optional ANSI styling; tests substitute a recording
//! renderer.

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::{Role, Transcript};

/// ANSI escape code for dim text (used for informational notices).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for bold text (used for role headers).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for cyan text (used for the user role header).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the assistant role header).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for error banners).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Recording renderers in tests
pub trait Renderer: Send {
    /// Print a fragment of response text.
    ///
    /// This is called incrementally as fragments are streamed from the API.
    /// Fragments carry no markup and concatenate to the full message, so
    /// rendering them in order is all that incremental display requires.
    fn print_text(&mut self, text: &str);

    /// Print an error banner.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a role header before a turn's content.
    fn print_role_header(&mut self, role: Role);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self);

    /// Returns true if streaming should be interrupted.
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// Outputs text directly to stdout, optionally styling role headers.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    line_start: bool,
    interrupted: Option<Arc<AtomicBool>>,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
            line_start: true,
            interrupted: None,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            line_start: true,
            interrupted: None,
        }
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        print!("{text}");
        self.line_start = text.ends_with('\n');
        self.flush();
    }

    fn ensure_line_start(&mut self) {
        if !self.line_start {
            self.write("\n");
        }
    }

    fn role_label(role: Role) -> &'static str {
        match role {
            Role::System => "System:",
            Role::User => "You:",
            Role::Assistant => "Assistant:",
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_text(&mut self, text: &str) {
        self.write(text);
    }

    fn print_error(&mut self, error: &str) {
        self.ensure_line_start();
        if self.use_color {
            eprintln!("{ANSI_RED}{error}{ANSI_RESET}");
        } else {
            eprintln!("{error}");
        }
        self.line_start = true;
    }

    fn print_info(&mut self, info: &str) {
        self.ensure_line_start();
        if self.use_color {
            self.write(&format!("{ANSI_DIM}{info}{ANSI_RESET}\n"));
        } else {
            self.write(info);
            self.write("\n");
        }
    }

    fn print_role_header(&mut self, role: Role) {
        self.ensure_line_start();
        let label = Self::role_label(role);
        if self.use_color {
            let color = match role {
                Role::User => ANSI_CYAN,
                _ => ANSI_GREEN,
            };
            self.write(&format!("{ANSI_BOLD}{color}{label}{ANSI_RESET}\n"));
        } else {
            self.write(&format!("{label}\n"));
        }
    }

    fn finish_response(&mut self) {
        self.ensure_line_start();
        self.write("\n");
    }

    fn print_interrupted(&mut self) {
        self.ensure_line_start();
        self.write("[interrupted]\n");
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Re-renders a whole transcript through the renderer.
///
/// Rendering is a pure function of the turn log: replaying the same
/// transcript produces the same output, with each turn shown once under
/// its role header regardless of whether it originally arrived whole or
/// as streamed fragments.
pub fn replay_transcript<R: Renderer + ?Sized>(renderer: &mut R, transcript: &Transcript) {
    for turn in transcript {
        renderer.print_role_header(turn.role);
        renderer.print_text(&turn.content);
        renderer.finish_response();
    }
}
