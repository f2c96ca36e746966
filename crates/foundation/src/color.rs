//! Colors as they appear in configuration (`"#46E96A"`) and as they are uploaded (`[f32; 4]`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("color `{0}` must start with '#'")]
    MissingHash(String),
    #[error("color `{0}` must have 3, 6 or 8 hex digits")]
    BadLength(String),
    #[error("color `{0}` contains a non-hex digit")]
    BadDigit(String),
}

/// Linear RGBA in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a packed `0xRRGGBB` value.
    pub fn from_rgb_u32(rgb: u32) -> Self {
        let r = ((rgb >> 16) & 0xff) as f32 / 255.0;
        let g = ((rgb >> 8) & 0xff) as f32 / 255.0;
        let b = (rgb & 0xff) as f32 / 255.0;
        Self::new(r, g, b, 1.0)
    }

    pub fn parse_hex(s: &str) -> Result<Self, ColorParseError> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }
        let channel = |i: usize, width: usize| -> Result<u8, ColorParseError> {
            let v = u8::from_str_radix(&digits[i..i + width], 16)
                .map_err(|_| ColorParseError::BadDigit(s.to_string()))?;
            Ok(if width == 1 { v * 17 } else { v })
        };
        let [r, g, b, a] = match digits.len() {
            3 => [channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, 255],
            6 => [channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, 255],
            8 => [channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, channel(6, 2)?],
            _ => return Err(ColorParseError::BadLength(s.to_string())),
        };
        Ok(Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ))
    }

    pub fn to_hex(self) -> String {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if q(self.a) == 255 {
            format!("#{:02x}{:02x}{:02x}", q(self.r), q(self.g), q(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                q(self.r),
                q(self.g),
                q(self.b),
                q(self.a)
            )
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn rgb(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorParseError, Rgba};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(Rgba::parse_hex("#fff"), Ok(Rgba::WHITE));
        let c = Rgba::parse_hex("#46E96A").unwrap();
        assert_eq!(c.to_hex(), "#46e96a");
        let translucent = Rgba::parse_hex("#ffffff80").unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(matches!(
            Rgba::parse_hex("46E96A"),
            Err(ColorParseError::MissingHash(_))
        ));
        assert!(matches!(
            Rgba::parse_hex("#0xd9d9d9"),
            Err(ColorParseError::BadDigit(_))
        ));
        assert!(matches!(
            Rgba::parse_hex("#12345"),
            Err(ColorParseError::BadLength(_))
        ));
    }

    #[test]
    fn packed_rgb_matches_hex() {
        assert_eq!(Rgba::from_rgb_u32(0x46e96a).to_hex(), "#46e96a");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c: Rgba = serde_json::from_str("\"#faf3dd\"").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#faf3dd\"");
        assert!(serde_json::from_str::<Rgba>("\"red\"").is_err());
    }
}
