//! Masking strategies
//!
//! Each rule in a policy compiles to one [`MaskStrategy`]. Strategies work on
//! the text form of a value and count in characters (Unicode scalar values),
//! never bytes.

pub mod last_four;
pub mod partial;
pub mod redaction;

pub use last_four::LastFourStrategy;
pub use partial::PartialStrategy;
pub use redaction::RedactionStrategy;

/// Trait for masking strategy implementations
pub trait MaskStrategy: Send + Sync {
    /// Masks a non-null value
    fn mask(&self, value: &str) -> String;

    /// Output for a NULL input; `None` keeps the NULL
    fn mask_null(&self) -> Option<String> {
        None
    }

    /// Short label for logs and reports
    fn label(&self) -> &'static str;
}

/// Last `n` characters of `value`, or all of it when shorter
pub(crate) fn last_chars(value: &str, n: usize) -> &str {
    let count = value.chars().count();
    if count <= n {
        return value;
    }
    let start = value
        .char_indices()
        .nth(count - n)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &value[start..]
}

/// First `floor(len / 2)` characters of `value`
pub(crate) fn first_half(value: &str) -> &str {
    let half = value.chars().count() / 2;
    let end = value
        .char_indices()
        .nth(half)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len());
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_chars() {
        assert_eq!(last_chars("123-45-6789", 4), "6789");
        assert_eq!(last_chars("abcd", 4), "abcd");
        assert_eq!(last_chars("ab", 4), "ab");
        assert_eq!(last_chars("", 4), "");
    }

    #[test]
    fn test_last_chars_multibyte() {
        assert_eq!(last_chars("zürich-straße", 4), "raße");
    }

    #[test]
    fn test_first_half() {
        assert_eq!(first_half("hello world"), "hello");
        assert_eq!(first_half("abcd"), "ab");
        assert_eq!(first_half("a"), "");
        assert_eq!(first_half(""), "");
    }

    #[test]
    fn test_first_half_multibyte() {
        assert_eq!(first_half("ñandú"), "ña");
    }
}
