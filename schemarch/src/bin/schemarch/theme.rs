//! Terminal palette and glyphs shared by console output, tables and `--help`.

use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Style};
use colored::Color;
use comfy_table::Color as TableColor;
use once_cell::sync::Lazy;
use schemarch::Provenance;

/// Colors by message role
pub struct Palette {
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    /// Section headings, usage line and help headers
    pub heading: Color,
    /// Spinner line while the extractors run
    pub progress: Color,
    /// Command lines in help examples
    pub command: Color,
    pub muted: Color,
    pub key: Color,
    pub value: Color,
}

pub static THEME: Lazy<Palette> = Lazy::new(|| Palette {
    success: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    info: Color::Blue,
    heading: Color::BrightBlue,
    progress: Color::Cyan,
    command: Color::Magenta,
    muted: Color::BrightBlack,
    key: Color::BrightCyan,
    value: Color::White,
});

impl Palette {
    /// clap help styles drawn from the same palette.
    pub fn help_styles(&self) -> Styles {
        let fg = |color: Color| Style::new().fg_color(Some(ansi(color).into()));
        Styles::styled()
            .usage(fg(self.heading).bold())
            .header(fg(self.progress).bold())
            .literal(fg(self.command))
            .placeholder(fg(self.muted))
            .valid(fg(self.success))
            .invalid(fg(self.warning))
            .error(fg(self.error).bold())
    }
}

/// Palette colors as ANSI codes; anything else renders white.
fn ansi(color: Color) -> AnsiColor {
    match color {
        Color::Green => AnsiColor::Green,
        Color::Red => AnsiColor::Red,
        Color::Yellow => AnsiColor::Yellow,
        Color::Blue => AnsiColor::Blue,
        Color::BrightBlue => AnsiColor::BrightBlue,
        Color::Cyan => AnsiColor::Cyan,
        Color::BrightCyan => AnsiColor::BrightCyan,
        Color::Magenta => AnsiColor::Magenta,
        Color::BrightBlack => AnsiColor::BrightBlack,
        _ => AnsiColor::White,
    }
}

/// Table cell color for where an entity came from.
pub fn provenance_color(source: Provenance) -> TableColor {
    match source {
        Provenance::Merged => TableColor::Green,
        Provenance::OpenApi => TableColor::Blue,
        Provenance::SourceDo | Provenance::SourceApi | Provenance::Source => TableColor::Yellow,
    }
}

pub struct Icons {
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub arrow: &'static str,
    pub bullet: &'static str,
    pub loading: &'static str,
    pub file: &'static str,
}

pub const ICONS: Icons = Icons {
    success: "✓",
    error: "✗",
    warning: "⚠",
    info: "ℹ",
    arrow: "→",
    bullet: "•",
    loading: "⟳",
    file: "📄",
};
