//! Hex color parsing and interpolation.
//!
//! Emitter colors are stored the way the editor writes them: hex strings with
//! 6 digits (`#rrggbb`, opaque) or 8 digits (`#rrggbbaa`). Particles blend
//! from a start color to an end color over their lifetime.
//!
//! Parsing never fails on the simulation path. Anything that is not a valid
//! 6 or 8 digit hex string resolves to opaque white:
//!
//! ```
//! use scenefx::Rgba;
//!
//! assert_eq!(Rgba::from_hex("#ff0000"), Rgba::new(255, 0, 0, 1.0));
//! assert_eq!(Rgba::from_hex("not a color"), Rgba::WHITE);
//! ```

use std::fmt;

use crate::error::ColorError;

/// An RGBA color with 8-bit channels and a real-valued alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    /// Opaque white, the fallback for any color that cannot be parsed.
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color, returning an error for malformed input.
    ///
    /// A leading `#` is optional. Eight digit colors carry alpha in the last
    /// pair, scaled from `0..=255` to `0.0..=1.0`.
    pub fn try_from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::Digit(hex.to_string()));
        }
        // All characters are ASCII from here on, so byte slicing is safe.
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorError::Digit(hex.to_string()))
        };
        match digits.len() {
            6 => Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, 1.0)),
            8 => Ok(Self::new(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)? as f32 / 255.0,
            )),
            n => Err(ColorError::Length(n)),
        }
    }

    /// Parse a hex color, falling back to opaque white.
    pub fn from_hex(hex: &str) -> Self {
        Self::try_from_hex(hex).unwrap_or(Self::WHITE)
    }

    /// Parse an optional hex color; a missing color is opaque white.
    pub fn from_hex_opt(hex: Option<&str>) -> Self {
        hex.map_or(Self::WHITE, Self::from_hex)
    }

    /// Component-wise linear interpolation from `self` to `other`.
    ///
    /// Color channels are rounded to the nearest integer, alpha is kept as a
    /// real number. `t` is expected in `[0, 1]`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let channel = |a: u8, b: u8| {
            let v = a as f32 + (b as f32 - a as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Normalized `[r, g, b, a]` with every channel in `[0, 1]`.
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a,
        ]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Formats as a CSS color, e.g. `rgba(255, 128, 0, 0.5)`.
impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_six_digits() {
        assert_eq!(Rgba::from_hex("#ff0000"), Rgba::new(255, 0, 0, 1.0));
        assert_eq!(Rgba::from_hex("00ff7f"), Rgba::new(0, 255, 127, 1.0));
    }

    #[test]
    fn test_parse_eight_digits() {
        let c = Rgba::from_hex("#ff000080");
        assert_eq!((c.r, c.g, c.b), (255, 0, 0));
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_uppercase() {
        assert_eq!(Rgba::from_hex("#FFAA00"), Rgba::new(255, 170, 0, 1.0));
    }

    #[test]
    fn test_malformed_falls_back_to_white() {
        assert_eq!(Rgba::from_hex(""), Rgba::WHITE);
        assert_eq!(Rgba::from_hex("#"), Rgba::WHITE);
        assert_eq!(Rgba::from_hex("#fff"), Rgba::WHITE);
        assert_eq!(Rgba::from_hex("#gg0000"), Rgba::WHITE);
        assert_eq!(Rgba::from_hex("#ff00000"), Rgba::WHITE);
        assert_eq!(Rgba::from_hex("#ff00é0"), Rgba::WHITE);
        assert_eq!(Rgba::from_hex_opt(None), Rgba::WHITE);
    }

    #[test]
    fn test_try_from_hex_errors() {
        assert_eq!(Rgba::try_from_hex("#abc"), Err(ColorError::Length(3)));
        assert!(matches!(
            Rgba::try_from_hex("#zzzzzz"),
            Err(ColorError::Digit(_))
        ));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgba::new(10, 20, 30, 1.0);
        let b = Rgba::new(200, 100, 0, 0.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_lerp_rounds_channels() {
        let a = Rgba::new(0, 0, 0, 1.0);
        let b = Rgba::new(255, 1, 3, 0.0);
        let mid = a.lerp(b, 0.5);
        // 127.5 rounds away from zero, 0.5 too, 1.5 as well
        assert_eq!((mid.r, mid.g, mid.b), (128, 1, 2));
        assert!((mid.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_display_css() {
        assert_eq!(
            Rgba::new(255, 128, 0, 0.5).to_string(),
            "rgba(255, 128, 0, 0.5)"
        );
    }
}
