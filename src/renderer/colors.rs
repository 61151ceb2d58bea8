/// Plain RGB triple, independent of the drawing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Bar color for categories that are not highlighted.
pub const BASE_BAR: Rgb = Rgb(31, 119, 180);
pub const MUTED_LABEL: Rgb = Rgb(150, 150, 150);

const NAMED: &[(&str, Rgb)] = &[
    ("black", Rgb(0, 0, 0)),
    ("blue", Rgb(0, 0, 255)),
    ("brown", Rgb(165, 42, 42)),
    ("crimson", Rgb(220, 20, 60)),
    ("darkgreen", Rgb(0, 100, 0)),
    ("darkorange", Rgb(255, 140, 0)),
    ("darkred", Rgb(139, 0, 0)),
    ("firebrick", Rgb(178, 34, 34)),
    ("forestgreen", Rgb(34, 139, 34)),
    ("gold", Rgb(255, 215, 0)),
    ("gray", Rgb(128, 128, 128)),
    ("green", Rgb(0, 128, 0)),
    ("grey", Rgb(128, 128, 128)),
    ("indigo", Rgb(75, 0, 130)),
    ("lightgray", Rgb(211, 211, 211)),
    ("magenta", Rgb(255, 0, 255)),
    ("maroon", Rgb(128, 0, 0)),
    ("navy", Rgb(0, 0, 128)),
    ("olive", Rgb(128, 128, 0)),
    ("orange", Rgb(255, 165, 0)),
    ("purple", Rgb(128, 0, 128)),
    ("rebeccapurple", Rgb(102, 51, 153)),
    ("red", Rgb(255, 0, 0)),
    ("royalblue", Rgb(65, 105, 225)),
    ("seagreen", Rgb(46, 139, 87)),
    ("sienna", Rgb(160, 82, 45)),
    ("steelblue", Rgb(70, 130, 180)),
    ("teal", Rgb(0, 128, 128)),
    ("tomato", Rgb(255, 99, 71)),
];

/// Resolves a CSS color name or `#rrggbb` hex string.
pub fn parse_color(value: &str) -> Option<Rgb> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Rgb(channel(0)?, channel(2)?, channel(4)?));
    }
    let lower = value.to_ascii_lowercase();
    NAMED.iter().find(|(name, _)| *name == lower).map(|(_, rgb)| *rgb)
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_hex_colors() {
        assert_eq!(parse_color("rebeccapurple"), Some(Rgb(102, 51, 153)));
        assert_eq!(parse_color("RoyalBlue"), Some(Rgb(65, 105, 225)));
        assert_eq!(parse_color("#663399"), Some(Rgb(102, 51, 153)));
        assert_eq!(parse_color("#66339"), None);
        assert_eq!(parse_color("#zz3399"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_hex_roundtrip() {
        assert_eq!(Rgb(102, 51, 153).to_hex(), "#663399");
    }
}
