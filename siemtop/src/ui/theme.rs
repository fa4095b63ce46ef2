//! Shared UI theme constants.

use ratatui::style::Color;

use crate::json_view::TokenKind;
use crate::types::Severity;

pub const INFO: Color = Color::Rgb(88, 166, 255);
pub const SUCCESS: Color = Color::Rgb(46, 160, 67);
pub const WARNING: Color = Color::Rgb(210, 153, 34);
pub const DANGER: Color = Color::Rgb(248, 81, 73);
pub const PURPLE: Color = Color::Rgb(163, 113, 247);
pub const CYAN: Color = Color::Rgb(57, 197, 207);
pub const PINK: Color = Color::Rgb(219, 97, 162);
pub const ORANGE: Color = Color::Rgb(240, 136, 62);

/// Series colours for categorical charts, in assignment order.
pub const PALETTE: [Color; 8] = [INFO, SUCCESS, WARNING, DANGER, PURPLE, CYAN, PINK, ORANGE];

pub const MUTED: Color = Color::Rgb(139, 148, 158);
pub const BORDER: Color = Color::Rgb(48, 54, 61);
pub const HIGHLIGHT_BG: Color = Color::Rgb(33, 38, 45);

pub fn severity_color(s: Severity) -> Color {
    match s {
        Severity::Low => SUCCESS,
        Severity::Medium => WARNING,
        Severity::High => DANGER,
        Severity::Critical => Color::Rgb(255, 123, 114),
    }
}

/// Colour for a raw severity string; unknown values render muted.
pub fn severity_str_color(s: &str) -> Color {
    Severity::parse(s).map_or(MUTED, severity_color)
}

pub fn token_color(kind: TokenKind) -> Color {
    match kind {
        TokenKind::Key => INFO,
        TokenKind::String => Color::Rgb(165, 214, 255),
        TokenKind::Number => ORANGE,
        TokenKind::Boolean => PURPLE,
        TokenKind::Null => MUTED,
        TokenKind::Plain => Color::Gray,
    }
}
