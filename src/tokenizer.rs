use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Either a body closed by terminal punctuation, or a body running to a newline / end of text.
    static ref SENTENCE_REGEX: Regex = Regex::new(r"[^.!?؟…\n]*[.!?؟…]+|[^.!?؟…\n]+").unwrap();
    static ref WORD_REGEX: Regex =
        Regex::new(r"[\p{L}\p{M}\p{N}_\x{200C}]+|[^\s\p{L}\p{M}\p{N}_\x{200C}]").unwrap();
}

/// Splits text into sentences and words.
///
/// Returned slices borrow from the input.
pub trait Tokenizer {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;
    fn words<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Regex based tokenizer.
///
/// Sentences keep their terminal punctuation (`.`, `!`, `?`, `؟`, `…`) and also
/// end at a newline. Words are runs of letters, marks, digits and zero-width
/// non-joiners; every other non-space character is a token of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexTokenizer;

impl Tokenizer for RegexTokenizer {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        SENTENCE_REGEX
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        WORD_REGEX.find_iter(text).map(|m| m.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentences_keep_terminators() {
        let sentences = RegexTokenizer.sentences("Is this ok? This is fine. Great!!");
        assert_eq!(sentences, vec!["Is this ok?", "This is fine.", "Great!!"]);
    }

    #[test]
    fn test_sentences_split_on_newline() {
        let sentences = RegexTokenizer.sentences("first line\nsecond line?\n\n");
        assert_eq!(sentences, vec!["first line", "second line?"]);
    }

    #[test]
    fn test_sentences_arabic_question_mark() {
        let sentences = RegexTokenizer.sentences("سلام. آیا این درست است؟");
        assert_eq!(sentences, vec!["سلام.", "آیا این درست است؟"]);
    }

    #[test]
    fn test_sentences_empty() {
        assert!(RegexTokenizer.sentences("").is_empty());
        assert!(RegexTokenizer.sentences(" \n\t ").is_empty());
        assert_eq!(RegexTokenizer.sentences("?"), vec!["?"]);
    }

    #[test]
    fn test_words_split_punctuation() {
        let words = RegexTokenizer.words("the cat, sat!");
        assert_eq!(words, vec!["the", "cat", ",", "sat", "!"]);
    }

    #[test]
    fn test_words_keep_zwnj() {
        let words = RegexTokenizer.words("من می\u{200C}روم؟");
        assert_eq!(words, vec!["من", "می\u{200C}روم", "؟"]);
    }
}
