//! Last-four strategy

use super::{last_chars, MaskStrategy};

/// Replacement followed by the last four characters of the value
///
/// Values shorter than four characters are appended whole.
pub struct LastFourStrategy {
    replacement: String,
}

impl LastFourStrategy {
    pub fn new(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
        }
    }
}

impl MaskStrategy for LastFourStrategy {
    fn mask(&self, value: &str) -> String {
        let tail = last_chars(value, 4);
        let mut out = String::with_capacity(self.replacement.len() + tail.len());
        out.push_str(&self.replacement);
        out.push_str(tail);
        out
    }

    fn label(&self) -> &'static str {
        "last_4"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_four() {
        let strategy = LastFourStrategy::new("XXX-XX-");
        assert_eq!(strategy.mask("123-45-6789"), "XXX-XX-6789");
    }

    #[test]
    fn test_short_value_is_appended_whole() {
        let strategy = LastFourStrategy::new("#");
        assert_eq!(strategy.mask("12"), "#12");
        assert_eq!(strategy.mask(""), "#");
    }

    #[test]
    fn test_null_stays_null() {
        assert_eq!(LastFourStrategy::new("#").mask_null(), None);
    }
}
