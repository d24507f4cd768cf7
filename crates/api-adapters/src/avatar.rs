//! Generated placeholder avatars for users without an upload.

use askama::Template;

const PALETTE: [&str; 15] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9", "#F8C471", "#82E0AA", "#F1948A", "#5DADE2", "#D7BDE2",
];

#[derive(Template)]
#[template(path = "avatar.svg")]
struct AvatarSvg<'a> {
    seed: i64,
    base: &'a str,
    shade: String,
    initial: String,
}

/// Scales each channel of `#RRGGBB` down by `percent`.
fn darken(hex: &str, percent: u32) -> String {
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2).unwrap_or("00"), 16).unwrap_or(0);
    let scale = |c: u8| (u32::from(c) * (100 - percent.min(100)) / 100) as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        scale(channel(1)),
        scale(channel(3)),
        scale(channel(5))
    )
}

/// Same seed and name, same SVG.
pub fn render(seed: i64, name: &str) -> askama::Result<String> {
    let base = PALETTE[seed.rem_euclid(PALETTE.len() as i64) as usize];
    let initial = name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "U".to_string());
    AvatarSvg { seed, base, shade: darken(base, 20), initial }.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_seed() {
        let a = render(7, "alice").unwrap();
        assert_eq!(a, render(7, "alice").unwrap());
        assert!(a.contains(PALETTE[7]));
        assert!(a.contains(">A</text>"));
        assert_ne!(a, render(8, "alice").unwrap());
    }

    #[test]
    fn empty_name_falls_back_to_u() {
        assert!(render(1, "  ").unwrap().contains(">U</text>"));
    }

    #[test]
    fn negative_seeds_stay_in_palette() {
        assert!(render(-1, "bob").unwrap().contains(PALETTE[14]));
    }

    #[test]
    fn shade_is_darker() {
        assert_eq!(darken("#FF6B6B", 20), "#cc5555");
        assert_eq!(darken("#000000", 20), "#000000");
    }
}
