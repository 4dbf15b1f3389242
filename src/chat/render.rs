//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the session
//! does not care where its output goes.  The default implementation writes to
//! stdout with optional ANSI styling and prints streamed responses
//! incrementally.

use std::io::{self, Stdout, Write};

use crate::chat::store::{Message, MessageId, Role};
use crate::chat::view::{View, WORKING_INDICATOR};

/// ANSI escape code for dim text (used for the working indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for the working indicator).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code for bold text (used for headings).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the assistant label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the user label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for image markers).
const ANSI_YELLOW: &str = "\x1b[33m";

/// Return to column zero and clear the line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Called when the placeholder `id` is opened, before any network I/O.
    fn start_response(&mut self, id: MessageId);

    /// Called with the placeholder after each fragment.
    ///
    /// The message text is cumulative; implementations that print
    /// incrementally must print only what they have not shown yet.
    fn update_message(&mut self, message: &Message);

    /// Called when the response stream has ended, cleanly or not.
    fn finish_response(&mut self);

    /// Print a complete message.
    fn print_message(&mut self, message: &Message);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a full projection of the session.
    fn print_view(&mut self, view: &View);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    streaming: Option<MessageId>,
    shown: usize,
    indicator: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            streaming: None,
            shown: 0,
            indicator: false,
        }
    }

    /// Consumes the renderer, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        // Terminal output is best effort.
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn style(&self, code: &'static str) -> &'static str {
        if self.use_color { code } else { "" }
    }

    fn label(&self, role: Role) -> String {
        let (color, name) = match role {
            Role::User => (ANSI_GREEN, "You"),
            Role::Assistant => (ANSI_CYAN, "Compass"),
        };
        format!(
            "{}{}{name}:{}",
            self.style(ANSI_BOLD),
            self.style(color),
            self.style(ANSI_RESET)
        )
    }

    fn clear_indicator(&mut self) {
        if self.indicator {
            self.indicator = false;
            if self.use_color {
                self.emit(ANSI_CLEAR_LINE);
            }
            let label = self.label(Role::Assistant);
            self.emit(&format!("{label} "));
        }
    }

    fn format_message(&self, message: &Message) -> String {
        let mut line = self.label(message.role());
        if let Some(image) = message.image() {
            line.push_str(&format!(
                " {}[image: {}]{}",
                self.style(ANSI_YELLOW),
                image.mime_type,
                self.style(ANSI_RESET)
            ));
        }
        if !message.text().is_empty() {
            line.push(' ');
            line.push_str(message.text());
        }
        line.push('\n');
        line
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn start_response(&mut self, id: MessageId) {
        self.streaming = Some(id);
        self.shown = 0;
        self.indicator = true;
        if self.use_color {
            self.emit(&format!("{ANSI_DIM}{ANSI_ITALIC}{WORKING_INDICATOR}{ANSI_RESET}"));
        } else {
            self.emit(&format!("{WORKING_INDICATOR}\n"));
        }
    }

    fn update_message(&mut self, message: &Message) {
        if self.streaming != Some(message.id()) {
            return;
        }
        let text = message.text();
        if text.len() <= self.shown {
            return;
        }
        self.clear_indicator();
        if let Some(unseen) = text.get(self.shown..) {
            self.emit(unseen);
            self.shown = text.len();
        }
    }

    fn finish_response(&mut self) {
        if self.streaming.take().is_none() {
            return;
        }
        if self.indicator {
            self.indicator = false;
            if self.use_color {
                self.emit(ANSI_CLEAR_LINE);
            }
        } else {
            self.emit("\n");
        }
        self.shown = 0;
    }

    fn print_message(&mut self, message: &Message) {
        let line = self.format_message(message);
        self.emit(&line);
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("Error: {error}");
    }

    fn print_info(&mut self, info: &str) {
        self.emit(&format!("{info}\n"));
    }

    fn print_view(&mut self, view: &View) {
        let mut out = format!(
            "{}{}{} ({})\n",
            self.style(ANSI_BOLD),
            view.title,
            self.style(ANSI_RESET),
            view.subtitle
        );
        let tabs: Vec<String> = view
            .age_tabs
            .iter()
            .map(|tab| {
                if tab.selected {
                    format!("[*{}]", tab.label)
                } else {
                    format!("[ {}]", tab.label)
                }
            })
            .collect();
        out.push_str(&tabs.join(" "));
        out.push_str("\n\n");
        for message in &view.messages {
            let mut line = self.label(message.role);
            if let Some(mime_type) = &message.image {
                line.push_str(&format!(" [image: {mime_type}]"));
            }
            if !message.text.is_empty() {
                line.push(' ');
                line.push_str(&message.text);
            }
            out.push_str(&line);
            out.push('\n');
        }
        if let Some(working) = view.working {
            out.push_str(&format!(
                "{}{working}{}\n",
                self.style(ANSI_DIM),
                self.style(ANSI_RESET)
            ));
        }
        out.push('\n');
        for (index, suggestion) in view.suggestions.iter().enumerate() {
            out.push_str(&format!("  {}. {suggestion}\n", index + 1));
        }
        out.push_str(&format!(
            "{}{}{}\n",
            self.style(ANSI_DIM),
            view.disclaimer,
            self.style(ANSI_RESET)
        ));
        self.emit(&out);
    }
}
