//! Timing string parsers
//!
//! Session exports encode lap times and positions in several textual forms.
//! Unusable values never raise errors: times become `None` and positions fall
//! back to the back of the grid.
//!
//! # Example
//!
//! ```
//! use podium::data::parser::{parse_position, parse_time};
//!
//! assert_eq!(parse_time("1:30.500"), Some(90.5));
//! assert_eq!(parse_time("DNF"), None);
//! assert_eq!(parse_position("P5"), 5);
//! assert_eq!(parse_position("DNS"), 20);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Position assigned to anything that cannot be read as a grid slot
pub const BACK_OF_GRID: u32 = 20;

/// Result markers for drivers without a classified time
const NON_FINISH_MARKERS: [&str; 6] = ["DNF", "DNS", "DSQ", "NC", "DQ", "RETIRED"];

static MINUTES_SECONDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)m([\d.]+)s").unwrap());
static PREFIXED_POSITION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^P(\d+)$").unwrap());
static ORDINAL_POSITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:st|nd|rd|th)$").unwrap());

/// True if the text carries a DNF-family marker (case-insensitive)
pub fn is_non_finish(text: &str) -> bool {
    let upper = text.to_uppercase();
    NON_FINISH_MARKERS.iter().any(|marker| upper.contains(marker))
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Parse a lap or session time into seconds.
///
/// Accepted forms, in order: `M:SS.mmm`, `<M>m<S>s`, and plain seconds with
/// any stray characters stripped (`83.456s`).
pub fn parse_time(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text == "-" || is_non_finish(text) {
        return None;
    }

    if text.contains(':') {
        let mut parts = text.split(':');
        let (minutes, seconds) = match (parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(s), None) => (m, s),
            _ => return None,
        };
        let minutes: u32 = minutes.trim().parse().ok()?;
        let seconds: f64 = seconds.trim().parse().ok()?;
        return finite(f64::from(minutes) * 60.0 + seconds);
    }

    if text.contains('m') && text.contains('s') {
        let caps = MINUTES_SECONDS_RE.captures(text)?;
        let minutes: u32 = caps[1].parse().ok()?;
        let seconds: f64 = caps[2].parse().ok()?;
        return finite(f64::from(minutes) * 60.0 + seconds);
    }

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok().and_then(finite)
}

/// Parse a race classification time.
///
/// Same forms as [`parse_time`], except gaps to the winner (`+12.345`) are
/// not absolute times and yield `None`.
pub fn parse_race_time(text: &str) -> Option<f64> {
    let text = text.trim();
    if is_non_finish(text) || text.starts_with('+') {
        return None;
    }
    parse_time(text)
}

/// Values that can be read as a grid or finishing position
pub trait GridPositionSource {
    fn grid_position(&self) -> u32;
}

impl GridPositionSource for str {
    fn grid_position(&self) -> u32 {
        let text = self.trim();
        if text.is_empty() || text == "-" {
            return BACK_OF_GRID;
        }

        if let Some(caps) = PREFIXED_POSITION_RE.captures(text) {
            if let Ok(pos) = caps[1].parse() {
                return pos;
            }
        }
        if let Some(caps) = ORDINAL_POSITION_RE.captures(text) {
            if let Ok(pos) = caps[1].parse() {
                return pos;
            }
        }

        if let Ok(pos) = text.parse::<i64>() {
            return u32::try_from(pos).unwrap_or(BACK_OF_GRID);
        }

        if is_non_finish(text) {
            return BACK_OF_GRID;
        }

        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        digits.parse().unwrap_or(BACK_OF_GRID)
    }
}

impl GridPositionSource for String {
    fn grid_position(&self) -> u32 {
        self.as_str().grid_position()
    }
}

impl GridPositionSource for u32 {
    fn grid_position(&self) -> u32 {
        *self
    }
}

impl GridPositionSource for i64 {
    fn grid_position(&self) -> u32 {
        u32::try_from(*self).unwrap_or(BACK_OF_GRID)
    }
}

impl GridPositionSource for f64 {
    fn grid_position(&self) -> u32 {
        if self.is_finite() && *self >= 0.0 && *self <= f64::from(u32::MAX) {
            *self as u32
        } else {
            BACK_OF_GRID
        }
    }
}

impl<T: GridPositionSource + ?Sized> GridPositionSource for &T {
    fn grid_position(&self) -> u32 {
        (**self).grid_position()
    }
}

impl<T: GridPositionSource> GridPositionSource for Option<T> {
    fn grid_position(&self) -> u32 {
        self.as_ref()
            .map(GridPositionSource::grid_position)
            .unwrap_or(BACK_OF_GRID)
    }
}

/// Parse a grid or finishing position, falling back to [`BACK_OF_GRID`]
pub fn parse_position<P: GridPositionSource + ?Sized>(value: &P) -> u32 {
    value.grid_position()
}
