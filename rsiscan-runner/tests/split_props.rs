//! Property tests for webhook message splitting.

use proptest::prelude::*;
use rsiscan_runner::split_message;

proptest! {
    #[test]
    fn chunks_respect_the_limit(text in "[a-zé |\n-]{0,400}", max_len in 1usize..80) {
        for chunk in split_message(&text, max_len) {
            prop_assert!(chunk.chars().count() <= max_len, "chunk too long: {:?}", chunk);
            prop_assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn no_visible_characters_are_lost(text in "[a-zé |\n-]{0,400}", max_len in 1usize..80) {
        let joined: String = split_message(&text, max_len).concat();
        let strip = |s: &str| s.chars().filter(|c| *c != '\n').collect::<String>();
        prop_assert_eq!(strip(&joined), strip(&text));
    }
}
