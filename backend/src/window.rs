//! Pagination windows over ranked collections.
//!
//! A request for `(start, count)` selects every rank in the inclusive range
//! `[start, start + count]`, so a page can hold `count + 1` rows. The
//! neighbouring pages start at `start - count - 1` and `start + count + 1`,
//! which keeps consecutive pages adjacent without overlap. Neither offset is
//! clamped.

use serde::Serialize;
use shared::{LeaderboardError, Result};

/// Page size used when the caller does not ask for one
pub const DEFAULT_COUNT: i64 = 30;

/// Resolved, inclusive rank range plus the starts of the adjacent pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub lo: i64,
    pub hi: i64,
    pub prev_start: i64,
    pub next_start: i64,
}

impl Window {
    pub fn resolve(start: i64, count: i64) -> Result<Self> {
        if count < 1 {
            return Err(LeaderboardError::InvalidWindow(format!(
                "count must be at least 1, got {}",
                count
            )));
        }

        let overflow =
            || LeaderboardError::InvalidWindow(format!("start {} is out of range", start));
        let hi = start.checked_add(count).ok_or_else(overflow)?;
        let next_start = hi.checked_add(1).ok_or_else(overflow)?;
        let prev_start = start
            .checked_sub(count)
            .and_then(|v| v.checked_sub(1))
            .ok_or_else(overflow)?;

        Ok(Self {
            lo: start,
            hi,
            prev_start,
            next_start,
        })
    }

    /// The window shown when no start is given.
    pub fn first_page(count: i64) -> Result<Self> {
        Self::resolve(0, count)
    }

    pub fn start(&self) -> i64 {
        self.lo
    }

    pub fn count(&self) -> i64 {
        self.hi - self.lo
    }

}

/// Parses a raw `start` path segment.
///
/// Accepts any finite, integral number, including spellings like `"5.0"` or
/// `"1e2"`. Rejects non-numeric input, NaN, infinities and fractions.
pub fn parse_start(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LeaderboardError::InvalidWindow("start is empty".to_string()));
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }

    let value: f64 = trimmed.parse().map_err(|_| {
        LeaderboardError::InvalidWindow(format!("start '{}' is not a number", raw))
    })?;
    if !value.is_finite() {
        return Err(LeaderboardError::InvalidWindow(format!(
            "start '{}' is not finite",
            raw
        )));
    }
    if value.fract() != 0.0 {
        return Err(LeaderboardError::InvalidWindow(format!(
            "start '{}' is not an integer",
            raw
        )));
    }
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(LeaderboardError::InvalidWindow(format!(
            "start '{}' is out of range",
            raw
        )));
    }
    Ok(value as i64)
}

/// Resolves the window for a request with an optional raw start and count.
pub fn resolve_request(start: Option<&str>, count: Option<i64>, default_count: i64) -> Result<Window> {
    let count = count.unwrap_or(default_count);
    match start {
        Some(raw) => Window::resolve(parse_start(raw)?, count),
        None => Window::first_page(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_default_window() {
        let window = resolve_request(None, None, DEFAULT_COUNT).unwrap();
        assert_eq!(
            window,
            Window {
                lo: 0,
                hi: 30,
                prev_start: -31,
                next_start: 31,
            }
        );
    }

    #[test]
    fn test_window_is_inclusive_of_both_bounds() {
        let window = Window::resolve(31, 30).unwrap();
        assert_eq!(window.lo, 31);
        assert_eq!(window.hi, 61);
        assert_eq!(window.count(), 30);
        assert_eq!(window.prev_start, 0);
        assert_eq!(window.next_start, 62);
    }

    #[test]
    fn test_offsets_are_not_clamped() {
        let window = Window::resolve(0, 2).unwrap();
        assert_eq!(window.prev_start, -3);
        assert_eq!(window.next_start, 3);
    }

    #[test]
    fn test_negative_start_is_accepted() {
        let window = resolve_request(Some("-31"), None, DEFAULT_COUNT).unwrap();
        assert_eq!(window.lo, -31);
        assert_eq!(window.hi, -1);
    }

    #[test_case(0 ; "zero")]
    #[test_case(-4 ; "negative")]
    fn test_non_positive_count_is_rejected(count: i64) {
        assert!(matches!(
            Window::resolve(0, count),
            Err(LeaderboardError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_overflowing_window_is_rejected() {
        assert!(Window::resolve(i64::MAX - 10, 30).is_err());
        assert!(Window::resolve(i64::MIN + 10, 30).is_err());
    }

    #[test_case("0", 0)]
    #[test_case("31", 31)]
    #[test_case("-31", -31)]
    #[test_case(" 62 ", 62 ; "surrounding whitespace")]
    #[test_case("+5", 5 ; "explicit plus")]
    #[test_case("5.0", 5 ; "integral float")]
    #[test_case("1e2", 100 ; "exponent")]
    fn test_parse_start_accepts(raw: &str, expected: i64) {
        assert_eq!(parse_start(raw).unwrap(), expected);
    }

    #[test_case("abc" ; "letters")]
    #[test_case("3.5" ; "fraction")]
    #[test_case("NaN" ; "nan")]
    #[test_case("inf" ; "infinity")]
    #[test_case("-Infinity" ; "negative infinity")]
    #[test_case("" ; "empty")]
    #[test_case("12abc" ; "trailing garbage")]
    #[test_case("1e300" ; "out of range")]
    fn test_parse_start_rejects(raw: &str) {
        assert!(matches!(parse_start(raw), Err(LeaderboardError::InvalidWindow(_))));
    }

    #[test]
    fn test_resolve_request_rejects_malformed_start() {
        let err = resolve_request(Some("abc"), None, DEFAULT_COUNT).unwrap_err();
        assert_eq!(
            err,
            LeaderboardError::InvalidWindow("start 'abc' is not a number".to_string())
        );
    }

    proptest! {
        #[test]
        fn window_spans_count(start in -1_000_000i64..1_000_000, count in 1i64..10_000) {
            let window = Window::resolve(start, count).unwrap();
            prop_assert_eq!(window.hi - window.lo, count);
            prop_assert_eq!(window.count(), count);
        }

        #[test]
        fn next_page_starts_after_last_rank(start in -1_000_000i64..1_000_000, count in 1i64..10_000) {
            let window = Window::resolve(start, count).unwrap();
            prop_assert_eq!(window.next_start, window.hi + 1);
            let next = Window::resolve(window.next_start, count).unwrap();
            prop_assert_eq!(next.prev_start, window.start());
        }

        #[test]
        fn integral_floats_parse_like_integers(start in -1_000_000i64..1_000_000) {
            prop_assert_eq!(parse_start(&format!("{}.0", start)).unwrap(), start);
        }
    }
}
