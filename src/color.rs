//! Packed ARGB colors.
//!
//! `System.Drawing.Color` is serialized as its packed 32-bit ARGB value in a
//! 7-bit varint. The codec keeps the packed form and renders the CSS-style
//! `rgba(r,g,b,a)` string the tree view shows, with the alpha channel scaled
//! to [0,1] and rounded to two decimals.

/// Alpha channel, 0..255.
pub fn alpha(argb: u32) -> u8 {
    (argb >> 24) as u8
}

/// Red channel.
pub fn red(argb: u32) -> u8 {
    (argb >> 16) as u8
}

/// Green channel.
pub fn green(argb: u32) -> u8 {
    (argb >> 8) as u8
}

/// Blue channel.
pub fn blue(argb: u32) -> u8 {
    argb as u8
}

/// Renders `rgba(r,g,b,a)` with alpha in [0,1] rounded to two decimals.
pub fn rgba_string(argb: u32) -> String {
    format!(
        "rgba({},{},{},{})",
        red(argb),
        green(argb),
        blue(argb),
        format_alpha(alpha(argb))
    )
}

/// Alpha als Dezimalzahl ohne nachlaufende Nullen: 255 -> "1", 128 -> "0.5".
fn format_alpha(a: u8) -> String {
    let hundredths = (f64::from(a) * 100.0 / 255.0).round() as u32;
    let (int, frac) = (hundredths / 100, hundredths % 100);
    if frac == 0 {
        format!("{int}")
    } else if frac % 10 == 0 {
        format!("{int}.{}", frac / 10)
    } else {
        format!("{int}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_extraction() {
        let c = 0xFF33_6699u32;
        assert_eq!(alpha(c), 0xFF);
        assert_eq!(red(c), 0x33);
        assert_eq!(green(c), 0x66);
        assert_eq!(blue(c), 0x99);
    }

    #[test]
    fn opaque_color() {
        assert_eq!(rgba_string(0xFF33_6699), "rgba(51,102,153,1)");
    }

    #[test]
    fn half_transparent_red() {
        // 128/255 = 0.50196 -> 0.5
        assert_eq!(rgba_string(0x80FF_0000), "rgba(255,0,0,0.5)");
    }

    #[test]
    fn fully_transparent() {
        assert_eq!(rgba_string(0x0000_0000), "rgba(0,0,0,0)");
    }

    #[test]
    fn quarter_alpha_keeps_two_decimals() {
        // 64/255 = 0.25098 -> 0.25
        assert_eq!(rgba_string(0x4000_00FF), "rgba(0,0,255,0.25)");
    }
}
