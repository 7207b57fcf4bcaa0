//! Parsing of free-text model answers into coordinates.

use pathreplay_platform_core::Point;

/// Parse an answer of the form `x,y`.
///
/// Surrounding whitespace, backticks and one pair of parentheses are
/// tolerated. Anything else, including non-finite numbers, yields `None`.
pub fn parse_coordinates(text: &str) -> Option<Point> {
    let trimmed = text.trim().trim_matches('`').trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);

    let (x, y) = inner.split_once(',')?;
    let x: f64 = x.trim().parse().ok()?;
    let y: f64 = y.trim().parse().ok()?;

    let point = Point::new(x, y);
    point.is_finite().then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_pair() {
        assert_eq!(parse_coordinates("123,456"), Some(Point::new(123.0, 456.0)));
    }

    #[test]
    fn decorated_pair() {
        assert_eq!(
            parse_coordinates("  `(12.5, 40)`\n"),
            Some(Point::new(12.5, 40.0))
        );
    }

    #[test]
    fn rejects_everything_else() {
        for text in [
            "",
            "123",
            "1,2,3",
            "x,y",
            "The cursor is at 10,20",
            "inf,5",
            "NaN,1",
            "10;20",
        ] {
            assert_eq!(parse_coordinates(text), None, "{text:?}");
        }
    }
}
