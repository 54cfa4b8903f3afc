use ratatui::style::Color;

pub const PRIMARY: Color = Color::from_u32(0x001ed760);
pub const SECONDARY: Color = Color::from_u32(0x00148a3e);
pub const NEUTRAL: Color = Color::from_u32(0x00404040);
pub const BACKGROUND: Color = Color::from_u32(0x000d0d0d);
pub const ACCENT: Color = Color::from_u32(0x00ff6b9d);
pub const ERROR: Color = Color::from_u32(0x00e5484d);
pub const MUTED: Color = Color::from_u32(0x008a8a8a);

/// Parses `#rrggbb` (leading `#` optional) into a terminal colour.
pub fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(Color::from_u32(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(parse_hex("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_hex("00ff00"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("zzzzzz"), None);
    }
}
