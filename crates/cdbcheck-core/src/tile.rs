//! Tile location and level-of-detail values.

use std::fmt;

/// Deepest level-of-detail a CDB tile hierarchy defines.
pub const MAX_LOD_LEVEL: u8 = 23;

/// Latitude code such as `N62` or `S05`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latitude {
    pub north: bool,
    pub degrees: u16,
}

impl Latitude {
    /// Parses a latitude code. Returns `None` when the direction letter is not
    /// `N`/`S`, the magnitude is not exactly two digits, or it exceeds 90.
    pub fn parse(code: &str) -> Option<Self> {
        let (letter, magnitude) = split_direction(code)?;
        let north = match letter {
            'N' => true,
            'S' => false,
            _ => return None,
        };
        let degrees = parse_fixed_digits(magnitude, 2)?;
        (degrees <= 90).then_some(Self { north, degrees })
    }
}

impl fmt::Display for Latitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = if self.north { 'N' } else { 'S' };
        write!(f, "{}{:02}", letter, self.degrees)
    }
}

/// Longitude code such as `W162` or `E005`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Longitude {
    pub east: bool,
    pub degrees: u16,
}

impl Longitude {
    /// Parses a longitude code. Returns `None` when the direction letter is not
    /// `E`/`W`, the magnitude is not exactly three digits, or it exceeds 180.
    pub fn parse(code: &str) -> Option<Self> {
        let (letter, magnitude) = split_direction(code)?;
        let east = match letter {
            'E' => true,
            'W' => false,
            _ => return None,
        };
        let degrees = parse_fixed_digits(magnitude, 3)?;
        (degrees <= 180).then_some(Self { east, degrees })
    }
}

impl fmt::Display for Longitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = if self.east { 'E' } else { 'W' };
        write!(f, "{}{:03}", letter, self.degrees)
    }
}

/// Level of detail: the coarsest sentinel `LC` or a numbered level `L00`..`L23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lod {
    Coarsest,
    Level(u8),
}

impl Lod {
    /// Parses `LC` or `L` followed by exactly two digits within `0..=23`.
    pub fn parse(token: &str) -> Option<Self> {
        if token == "LC" {
            return Some(Lod::Coarsest);
        }
        let digits = token.strip_prefix('L')?;
        let level = parse_fixed_digits(digits, 2)?;
        if level > u16::from(MAX_LOD_LEVEL) {
            return None;
        }
        Some(Lod::Level(level as u8))
    }

    /// Largest valid UREF/RREF index at this level.
    ///
    /// The tile grid doubles in each direction per level, so level `n` has
    /// `2^n` rows and columns. `LC` is a single tile.
    pub fn max_ref(&self) -> u32 {
        match self {
            Lod::Coarsest => 0,
            Lod::Level(n) => (1u32 << n) - 1,
        }
    }

    /// True if `index` addresses a tile at this level.
    pub fn contains_ref(&self, index: u64) -> bool {
        index <= u64::from(self.max_ref())
    }
}

impl fmt::Display for Lod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lod::Coarsest => f.write_str("LC"),
            Lod::Level(n) => write!(f, "L{:02}", n),
        }
    }
}

fn split_direction(code: &str) -> Option<(char, &str)> {
    let mut chars = code.chars();
    let letter = chars.next()?;
    Some((letter, chars.as_str()))
}

/// Parses a string of exactly `width` ASCII digits.
fn parse_fixed_digits(digits: &str, width: usize) -> Option<u16> {
    if digits.len() != width || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_range() {
        assert_eq!(
            Latitude::parse("N62"),
            Some(Latitude {
                north: true,
                degrees: 62
            })
        );
        assert!(Latitude::parse("S90").is_some());
        assert!(Latitude::parse("N00").is_some());
        assert!(Latitude::parse("N91").is_none());
        assert!(Latitude::parse("N99").is_none());
        assert!(Latitude::parse("E62").is_none());
        assert!(Latitude::parse("N6").is_none());
        assert!(Latitude::parse("").is_none());
    }

    #[test]
    fn test_longitude_range() {
        assert!(Longitude::parse("W162").is_some());
        assert!(Longitude::parse("E180").is_some());
        assert!(Longitude::parse("W181").is_none());
        assert!(Longitude::parse("W999").is_none());
        assert!(Longitude::parse("N162").is_none());
        assert!(Longitude::parse("W62").is_none());
    }

    #[test]
    fn test_display_round_trips_padding() {
        assert_eq!(Latitude::parse("S05").unwrap().to_string(), "S05");
        assert_eq!(Longitude::parse("E007").unwrap().to_string(), "E007");
        assert_eq!(Lod::parse("L07").unwrap().to_string(), "L07");
        assert_eq!(Lod::parse("LC").unwrap().to_string(), "LC");
    }

    #[test]
    fn test_lod_parse() {
        assert_eq!(Lod::parse("LC"), Some(Lod::Coarsest));
        assert_eq!(Lod::parse("L00"), Some(Lod::Level(0)));
        assert_eq!(Lod::parse("L23"), Some(Lod::Level(23)));
        assert_eq!(Lod::parse("L24"), None);
        assert_eq!(Lod::parse("L99"), None);
        assert_eq!(Lod::parse("L7"), None);
        assert_eq!(Lod::parse("L007"), None);
        assert_eq!(Lod::parse("LX"), None);
    }

    #[test]
    fn test_lod_ref_bounds() {
        assert_eq!(Lod::Coarsest.max_ref(), 0);
        assert_eq!(Lod::Level(0).max_ref(), 0);
        assert_eq!(Lod::Level(7).max_ref(), 127);
        assert!(Lod::Level(7).contains_ref(38));
        assert!(Lod::Level(7).contains_ref(102));
        assert!(!Lod::Level(7).contains_ref(999));
        assert!(Lod::Coarsest.contains_ref(0));
        assert!(!Lod::Coarsest.contains_ref(1));
    }

    #[test]
    fn test_lod_bound_strictly_increases() {
        let mut previous = Lod::Coarsest.max_ref();
        for level in 1..=MAX_LOD_LEVEL {
            let bound = Lod::Level(level).max_ref();
            assert!(bound > previous, "L{:02} bound {} <= {}", level, bound, previous);
            previous = bound;
        }
    }
}
