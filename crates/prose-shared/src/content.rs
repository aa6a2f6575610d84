//! Publishing policy for post content.
//!
//! Length is measured in Unicode scalar values, so a 500-character post
//! written in any script is accepted.

use crate::constants::{MAX_POST_LENGTH, NEAR_LIMIT_THRESHOLD};
use crate::error::ContentError;

/// Number of characters in `content`.
pub fn char_count(content: &str) -> usize {
    content.chars().count()
}

/// Characters left before hitting the limit. Negative when over.
pub fn remaining_chars(content: &str) -> i64 {
    MAX_POST_LENGTH as i64 - char_count(content) as i64
}

/// Whether the composer should warn that the limit is close.
pub fn is_near_limit(content: &str) -> bool {
    let remaining = remaining_chars(content);
    (0..=NEAR_LIMIT_THRESHOLD as i64).contains(&remaining)
}

/// Check that `content` may be published: non-blank and at most
/// [`MAX_POST_LENGTH`] characters.
pub fn validate_post_content(content: &str) -> Result<(), ContentError> {
    if content.trim().is_empty() {
        return Err(ContentError::Empty);
    }
    let len = char_count(content);
    if len > MAX_POST_LENGTH {
        return Err(ContentError::TooLong {
            len,
            max: MAX_POST_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_boundaries() {
        assert_eq!(validate_post_content(""), Err(ContentError::Empty));
        assert_eq!(validate_post_content("   \n\t"), Err(ContentError::Empty));
        assert!(validate_post_content(&"a".repeat(500)).is_ok());
        assert_eq!(
            validate_post_content(&"a".repeat(501)),
            Err(ContentError::TooLong { len: 501, max: 500 })
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let content = "é".repeat(500);
        assert_eq!(content.len(), 1000);
        assert!(validate_post_content(&content).is_ok());
    }

    #[test]
    fn test_remaining_and_near_limit() {
        assert_eq!(remaining_chars("hello"), 495);
        assert!(!is_near_limit("hello"));
        assert!(is_near_limit(&"x".repeat(450)));
        assert!(is_near_limit(&"x".repeat(500)));
        assert!(!is_near_limit(&"x".repeat(501)));
        assert_eq!(remaining_chars(&"x".repeat(501)), -1);
    }
}
