//! Hex to HSL conversion for CSS custom properties.
//!
//! The output format is `"<hue> <sat>% <light>%"`, the space-separated triple
//! consumed by `hsl(var(--primary))` style declarations.

use std::fmt;

use super::error::ColorError;

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#RGB`, `#RRGGBB`, `RGB` or `RRGGBB`.
    ///
    /// # Errors
    ///
    /// `ColorError::InvalidHex` for any other length or a non-hex digit.
    pub fn parse_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::invalid(hex));
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ColorError::invalid(hex));

        match digits.len() {
            3 => {
                // #abc expands to #aabbcc: each nibble doubled is nibble * 17
                let nibble = |i: usize| channel(&digits[i..=i]).map(|n| n * 17);
                Ok(Self {
                    r: nibble(0)?,
                    g: nibble(1)?,
                    b: nibble(2)?,
                })
            }
            6 => Ok(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
            }),
            _ => Err(ColorError::invalid(hex)),
        }
    }
}

/// Hue in degrees, saturation and lightness in percent, all rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl From<Rgb> for Hsl {
    fn from(rgb: Rgb) -> Self {
        let red = f64::from(rgb.r) / 255.0;
        let green = f64::from(rgb.g) / 255.0;
        let blue = f64::from(rgb.b) / 255.0;

        let max = red.max(green).max(blue);
        let min = red.min(green).min(blue);
        let lightness = f64::midpoint(max, min);

        // Channels are exact multiples of 1/255, so equality is exact here.
        let (hue, saturation) = if rgb.r == rgb.g && rgb.g == rgb.b {
            (0.0, 0.0)
        } else {
            let delta = max - min;
            let saturation = if lightness > 0.5 {
                delta / (2.0 - max - min)
            } else {
                delta / (max + min)
            };
            let sector = if rgb.r >= rgb.g && rgb.r >= rgb.b {
                (green - blue) / delta + if green < blue { 6.0 } else { 0.0 }
            } else if rgb.g >= rgb.b {
                (blue - red) / delta + 2.0
            } else {
                (red - green) / delta + 4.0
            };
            (sector / 6.0, saturation)
        };

        // All three values are within [0, 360] / [0, 100] before the cast.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self {
            hue: ((hue * 360.0).round() as u16) % 360,
            saturation: (saturation * 100.0).round() as u8,
            lightness: (lightness * 100.0).round() as u8,
        }
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}% {}%", self.hue, self.saturation, self.lightness)
    }
}

/// Output of [`hex_to_hsl`] for input that is not a hex color.
pub const INVALID_HSL: &str = "NaN NaN% NaN%";

/// `true` for 3- or 6-digit hex colors, with or without a leading `#`.
#[must_use]
pub fn is_valid_hex(hex: &str) -> bool {
    Rgb::parse_hex(hex).is_ok()
}

/// Convert a hex color to the `"<hue> <sat>% <light>%"` CSS triple.
///
/// Callers must validate the input with [`is_valid_hex`] (or use
/// [`Rgb::parse_hex`] directly); malformed input yields [`INVALID_HSL`].
#[must_use]
pub fn hex_to_hsl(hex: &str) -> String {
    Rgb::parse_hex(hex)
        .map_or_else(|_| INVALID_HSL.to_owned(), |rgb| Hsl::from(rgb).to_string())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn black_and_white() {
        assert_eq!(hex_to_hsl("#000000"), "0 0% 0%");
        assert_eq!(hex_to_hsl("#FFFFFF"), "0 0% 100%");
    }

    #[test]
    fn platform_colors_are_pinned() {
        assert_eq!(hex_to_hsl("#f97316"), "25 95% 53%");
        assert_eq!(hex_to_hsl("#ea580c"), "21 90% 48%");
    }

    #[test]
    fn primaries() {
        assert_eq!(hex_to_hsl("#ff0000"), "0 100% 50%");
        assert_eq!(hex_to_hsl("#00ff00"), "120 100% 50%");
        assert_eq!(hex_to_hsl("#0000ff"), "240 100% 50%");
    }

    #[test]
    fn shorthand_matches_long_form() {
        assert_eq!(hex_to_hsl("#FFF"), hex_to_hsl("#FFFFFF"));
        assert_eq!(hex_to_hsl("f80"), hex_to_hsl("#ff8800"));
    }

    #[test]
    fn leading_hash_is_optional() {
        assert_eq!(hex_to_hsl("f97316"), hex_to_hsl("#f97316"));
    }

    #[test]
    fn grey_is_achromatic() {
        let hsl = Hsl::from(Rgb::parse_hex("#808080").unwrap());
        assert_eq!(hsl.hue, 0);
        assert_eq!(hsl.saturation, 0);
        assert_eq!(hsl.lightness, 50);
    }

    #[test]
    fn hue_near_full_turn_wraps_to_zero() {
        // hue of #ff0001 is 359.76 degrees, which rounds to 360
        let hsl = Hsl::from(Rgb::parse_hex("#ff0001").unwrap());
        assert_eq!(hsl.hue, 0);
    }

    #[test]
    fn malformed_input_is_rejected() {
        for bad in [
            "", "#", "#12", "#12345", "#1234567", "#ggg", "red", "#12 456",
        ] {
            assert!(!is_valid_hex(bad), "{bad:?} should be invalid");
            assert_eq!(hex_to_hsl(bad), INVALID_HSL);
        }
    }

    #[test]
    fn parse_error_names_the_input() {
        let err = Rgb::parse_hex("#zz0000").unwrap_err();
        assert!(err.to_string().contains("#zz0000"));
    }

    fn hex6() -> impl Strategy<Value = String> {
        any::<[u8; 3]>().prop_map(|[r, g, b]| format!("#{r:02x}{g:02x}{b:02x}"))
    }

    proptest! {
        #[test]
        fn prop_components_stay_in_range(hex in hex6()) {
            let hsl = Hsl::from(Rgb::parse_hex(&hex).unwrap());
            prop_assert!(hsl.hue < 360);
            prop_assert!(hsl.saturation <= 100);
            prop_assert!(hsl.lightness <= 100);
        }

        #[test]
        fn prop_shorthand_equals_expanded(r in 0u8..16, g in 0u8..16, b in 0u8..16) {
            let short = format!("#{r:x}{g:x}{b:x}");
            let long = format!("#{r:x}{r:x}{g:x}{g:x}{b:x}{b:x}");
            prop_assert_eq!(hex_to_hsl(&short), hex_to_hsl(&long));
        }

        #[test]
        fn prop_case_and_hash_do_not_matter(hex in hex6()) {
            let upper = hex.to_uppercase();
            let bare = hex.trim_start_matches('#').to_owned();
            prop_assert_eq!(hex_to_hsl(&hex), hex_to_hsl(&upper));
            prop_assert_eq!(hex_to_hsl(&hex), hex_to_hsl(&bare));
        }
    }
}
