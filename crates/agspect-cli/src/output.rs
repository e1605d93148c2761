use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Plain-output writer. Styling is applied only when stdout is a terminal.
pub struct Printer {
    color: bool,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }

    pub fn heading(&self, text: &str) {
        if self.color {
            println!("{}", text.bold());
        } else {
            println!("{}", text);
        }
    }

    pub fn field(&self, name: &str, value: &str) {
        if self.color {
            println!("  {} {}", format!("{}:", name).dimmed(), value);
        } else {
            println!("  {}: {}", name, value);
        }
    }

    /// One tagged entry line: a bracketed badge, the preview, and a dimmed
    /// source path on the right.
    pub fn entry(&self, badge: &str, preview: &str, source: &str) {
        if self.color {
            println!("  [{}] {}  {}", badge.cyan(), preview, source.dimmed());
        } else {
            println!("  [{}] {}  ({})", badge, preview, source);
        }
    }

    pub fn blank(&self) {
        println!();
    }
}
