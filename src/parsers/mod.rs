//! Text parsers for pseudo-filesystem files and hardware tool output.
//!
//! Every parser here is a pure function over captured text. Formats differ
//! between vendors and tool versions, so extraction is expressed as ordered
//! lists of strategies: the first strategy that yields a value wins.

pub mod df;
pub mod lsblk;
pub mod procfs;
pub mod sensors;
pub mod smart;

/// A named, pure extraction strategy.
#[derive(Clone, Copy)]
pub struct Strategy<T> {
    pub name: &'static str,
    pub parse: fn(&str) -> Option<T>,
}

impl<T> Strategy<T> {
    pub const fn new(name: &'static str, parse: fn(&str) -> Option<T>) -> Self {
        Self { name, parse }
    }
}

/// Applies strategies in order and returns the first hit with its name.
pub fn first_match<T>(text: &str, strategies: &[Strategy<T>]) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|s| (s.parse)(text).map(|value| (s.name, value)))
}

/// Parses the digits at the start of `raw` ("35 (Min/Max 18/45)" -> 35).
pub fn leading_number(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: &str) -> Option<u32> {
        None
    }

    fn length(text: &str) -> Option<u32> {
        Some(text.len() as u32)
    }

    fn always_seven(_: &str) -> Option<u32> {
        Some(7)
    }

    #[test]
    fn test_first_match_order() {
        let chain = [
            Strategy::new("never", never),
            Strategy::new("length", length),
            Strategy::new("seven", always_seven),
        ];
        assert_eq!(first_match("abc", &chain), Some(("length", 3)));
    }

    #[test]
    fn test_first_match_none() {
        let chain = [Strategy::new("never", never)];
        assert_eq!(first_match("abc", &chain), None);
        assert_eq!(first_match::<u32>("abc", &[]), None);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("35 (0 18 0 0 0)"), Some(35));
        assert_eq!(leading_number("12345h+23m+10.123s"), Some(12345));
        assert_eq!(leading_number("  0"), Some(0));
        assert_eq!(leading_number("-"), None);
        assert_eq!(leading_number(""), None);
    }
}
