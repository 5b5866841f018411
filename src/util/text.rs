//! Utility functions for text inspection

/// A trigger may only start after a line start or whitespace.
///
/// `prev` is the character immediately before the trigger, `None` at the
/// start of the document.
pub fn is_mention_boundary(prev: Option<char>) -> bool {
    prev.map_or(true, char::is_whitespace)
}

/// Number of chars in a string (all offsets in this crate are char offsets)
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
