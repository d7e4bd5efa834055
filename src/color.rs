//! Colors and the heuristic that gives them a human-readable name.
//!
//! Naming is an ordered table of threshold bands, evaluated first-match-wins.
//! Every comparison is strict, so a channel sitting exactly on a band edge
//! (say red = 200) falls through to later rules. The bands overlap: orange
//! shadows yellow and pink shadows white, and that ordering is kept as-is.

use std::fmt;
use std::str::FromStr;

/// A 24-bit RGB color.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Color {
    /// Red channel
    pub red: u8,
    /// Green channel
    pub green: u8,
    /// Blue channel
    pub blue: u8,
}

impl Color {
    /// Builds a color from its three channels.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// The `#RRGGBB` form, lowercase, as HTML color inputs expect it.
    pub fn to_html_value(self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

/// Uppercase `#RRGGBB`.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Returned when a string is not a `#RRGGBB` color.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColorParseError(String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid color {:?}, expected #RRGGBB", self.0)
    }
}

impl std::error::Error for ColorParseError {}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts six hex digits with an optional leading `#`, in either case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError(value.to_string());
        let digits = value.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(invalid)
        };
        Ok(Self {
            red: channel(0..2)?,
            green: channel(2..4)?,
            blue: channel(4..6)?,
        })
    }
}

/// The fixed set of basic color names.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BasicColor {
    /// red
    Red,
    /// orange
    Orange,
    /// yellow
    Yellow,
    /// green
    Green,
    /// blue
    Blue,
    /// purple
    Purple,
    /// pink
    Pink,
    /// teal
    Teal,
    /// white
    White,
    /// black
    Black,
}

impl BasicColor {
    /// Lowercase name of the color.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Teal => "teal",
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

/// Which channel dominates a color that matched no basic band.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Tint {
    /// Red is the strict maximum
    Reddish,
    /// Green is the strict maximum
    Greenish,
    /// Blue is the strict maximum
    Bluish,
    /// No single channel is the strict maximum
    Custom,
}

impl Tint {
    fn dominant(color: Color) -> Self {
        let Color { red, green, blue } = color;
        if red > green && red > blue {
            Self::Reddish
        } else if green > red && green > blue {
            Self::Greenish
        } else if blue > red && blue > green {
            Self::Bluish
        } else {
            Self::Custom
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Reddish => "reddish",
            Self::Greenish => "greenish",
            Self::Bluish => "bluish",
            Self::Custom => "custom color",
        }
    }
}

/// Short descriptive name for a color.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ColorLabel {
    /// One of the basic names, eg `red`
    Basic(BasicColor),
    /// Fallback embedding the hex code, eg `reddish (#A1B2C3)`
    Tinted {
        /// Dominant channel
        tint: Tint,
        /// The color that was named
        color: Color,
    },
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(basic) => f.write_str(basic.as_str()),
            Self::Tinted { tint, color } => write!(f, "{} ({color})", tint.as_str()),
        }
    }
}

/// One band of the naming table.
#[derive(Clone, Copy, Debug)]
pub struct ColorRule {
    /// Name given to colors inside the band
    pub label: BasicColor,
    predicate: fn(Color) -> bool,
}

impl ColorRule {
    /// True when the color falls inside this band.
    pub fn matches(&self, color: Color) -> bool {
        (self.predicate)(color)
    }
}

/// The naming bands in evaluation order.
pub static COLOR_RULES: [ColorRule; 10] = [
    ColorRule {
        label: BasicColor::Red,
        predicate: |c| c.red > 200 && c.green < 100 && c.blue < 100,
    },
    ColorRule {
        label: BasicColor::Orange,
        predicate: |c| c.red > 200 && c.green > 150 && c.blue < 100,
    },
    ColorRule {
        label: BasicColor::Yellow,
        predicate: |c| c.red > 200 && c.green > 200 && c.blue < 100,
    },
    ColorRule {
        label: BasicColor::Green,
        predicate: |c| c.red < 100 && c.green > 200 && c.blue < 100,
    },
    ColorRule {
        label: BasicColor::Blue,
        predicate: |c| c.red < 100 && c.green < 100 && c.blue > 200,
    },
    ColorRule {
        label: BasicColor::Purple,
        predicate: |c| c.red > 150 && c.green < 100 && c.blue > 150,
    },
    ColorRule {
        label: BasicColor::Pink,
        predicate: |c| c.red > 200 && c.green > 150 && c.blue > 200,
    },
    ColorRule {
        label: BasicColor::Teal,
        predicate: |c| c.red < 100 && c.green > 150 && c.blue > 150,
    },
    ColorRule {
        label: BasicColor::White,
        predicate: |c| c.red > 200 && c.green > 200 && c.blue > 200,
    },
    ColorRule {
        label: BasicColor::Black,
        predicate: |c| c.red < 100 && c.green < 100 && c.blue < 100,
    },
];

/// Names a color. Never fails.
pub fn name_color(color: Color) -> ColorLabel {
    COLOR_RULES
        .iter()
        .find(|rule| rule.matches(color))
        .map(|rule| ColorLabel::Basic(rule.label))
        .unwrap_or_else(|| ColorLabel::Tinted {
            tint: Tint::dominant(color),
            color,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(red: u8, green: u8, blue: u8) -> String {
        name_color(Color::new(red, green, blue)).to_string()
    }

    #[test]
    fn parses_hex_with_and_without_marker() {
        assert_eq!("#FF5733".parse(), Ok(Color::new(255, 87, 51)));
        assert_eq!("ff5733".parse(), Ok(Color::new(255, 87, 51)));
        assert_eq!(" #1e90ff ".parse(), Ok(Color::new(30, 144, 255)));
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["", "#", "#12345", "#1234567", "#GGGGGG", "##12345", "#12 456"] {
            assert!(bad.parse::<Color>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn displays_uppercase() {
        let color: Color = "#a1b2c3".parse().expect("valid color");
        assert_eq!(color.to_string(), "#A1B2C3");
        assert_eq!(color.to_html_value(), "#a1b2c3");
    }

    #[test]
    fn red_band_is_exactly_red() {
        for red in (201..=255).step_by(6) {
            for green in (0..100).step_by(9) {
                for blue in (0..100).step_by(11) {
                    assert_eq!(label(red, green, blue), "red", "({red},{green},{blue})");
                }
            }
        }
    }

    #[test]
    fn basic_bands() {
        assert_eq!(label(255, 160, 0), "orange");
        assert_eq!(label(0, 255, 0), "green");
        assert_eq!(label(30, 60, 255), "blue");
        assert_eq!(label(160, 0, 160), "purple");
        assert_eq!(label(0, 200, 200), "teal");
        assert_eq!(label(0, 0, 0), "black");
    }

    #[test]
    fn earlier_bands_shadow_later_ones() {
        // yellow and white are never reached: orange and pink come first
        assert_eq!(label(201, 201, 50), "orange");
        assert_eq!(label(255, 255, 0), "orange");
        assert_eq!(label(255, 255, 255), "pink");
        let yellow = Color::new(255, 255, 0);
        assert!(
            COLOR_RULES
                .iter()
                .any(|rule| rule.label == BasicColor::Yellow && rule.matches(yellow))
        );
    }

    #[test]
    fn band_edges_fall_through() {
        assert_eq!(label(200, 50, 50), "reddish (#C83232)");
        assert_eq!(label(200, 160, 50), "reddish (#C8A032)");
        assert_eq!(label(200, 201, 50), "greenish (#C8C932)");
        assert_eq!(label(100, 100, 100), "custom color (#646464)");
        assert_eq!(label(99, 99, 99), "black");
    }

    #[test]
    fn achromatic_mid_tones_are_custom() {
        for value in 100..=200u8 {
            let expected = format!("custom color ({})", Color::new(value, value, value));
            assert_eq!(label(value, value, value), expected);
        }
    }

    #[test]
    fn dominant_channel_fallback() {
        assert_eq!(label(30, 144, 255), "bluish (#1E90FF)");
        assert_eq!(label(120, 180, 120), "greenish (#78B478)");
        assert_eq!(label(128, 0, 128), "custom color (#800080)");
    }

    #[test]
    fn naming_is_pure() {
        let color = Color::new(161, 178, 195);
        assert_eq!(name_color(color), name_color(color));
        assert_eq!(
            name_color(color),
            ColorLabel::Tinted {
                tint: Tint::Bluish,
                color
            }
        );
    }
}
