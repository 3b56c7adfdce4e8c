use std::collections::HashMap;

use tracing::debug;

use crate::models::{Message, MessageId};
use crate::tokenizer::Tokenizer;

/// Glyphs that mark a sentence as interrogative: ASCII `?` and Arabic `؟`.
pub const QUESTION_MARKS: [char; 2] = ['?', '\u{061F}'];

/// Returns `true` if the sentence contains either question mark.
pub fn is_interrogative(sentence: &str) -> bool {
    sentence.contains(QUESTION_MARKS)
}

/// Decides whether a reconstructed message text asks something.
#[derive(Clone, Copy)]
pub struct QuestionDetector<'a> {
    tokenizer: &'a dyn Tokenizer,
}

impl<'a> QuestionDetector<'a> {
    pub fn new(tokenizer: &'a dyn Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// A text is a question if at least one of its sentences is interrogative.
    /// Empty text has no sentences and is never a question.
    pub fn is_question(&self, text: &str) -> bool {
        self.tokenizer
            .sentences(text)
            .iter()
            .any(|sentence| is_interrogative(sentence))
    }
}

/// Message id to "is a question" lookup, built once over the whole transcript.
///
/// Ids that were never classified (replies pointing outside the transcript)
/// read as `false`.
#[derive(Debug, Clone, Default)]
pub struct QuestionIndex {
    entries: HashMap<MessageId, bool>,
}

impl QuestionIndex {
    pub fn build(messages: &[Message], detector: &QuestionDetector<'_>) -> Self {
        let mut entries = HashMap::with_capacity(messages.len());

        for message in messages {
            let text = message.text.reconstruct();
            let question = detector.is_question(&text);
            if question {
                debug!("Message {} is a question", message.id);
            }
            // Duplicate ids: a question anywhere under that id wins.
            *entries.entry(message.id.clone()).or_insert(false) |= question;
        }

        Self { entries }
    }

    pub fn is_question(&self, id: &MessageId) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    /// Number of classified messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of messages classified as questions.
    pub fn question_count(&self) -> usize {
        self.entries.values().filter(|&&question| question).count()
    }
}
