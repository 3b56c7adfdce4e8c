use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{Result, StatsError};
use crate::models::{Message, MessageText};
use crate::normalizer::Normalizer;
use crate::tokenizer::Tokenizer;

/// Words left out of the word cloud, stored in normalized form.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Reads a newline-delimited stop word list. Lines are trimmed and
    /// normalized; blank lines are dropped.
    pub fn load<P: AsRef<Path>>(path: P, normalizer: &dyn Normalizer) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading stop words from {}", path.display());

        let bytes = fs::read(path).map_err(|e| StatsError::io(path, e))?;
        let content = String::from_utf8(bytes).map_err(|_| StatsError::Encoding {
            path: path.to_path_buf(),
        })?;
        let stop_words = Self::from_lines(content.lines(), normalizer);

        info!("Loaded {} stop words", stop_words.len());
        Ok(stop_words)
    }

    pub fn from_lines<I, S>(lines: I, normalizer: &dyn Normalizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = lines
            .into_iter()
            .map(|line| normalizer.normalize(line.as_ref().trim()))
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Tokenizes message text and drops stop words.
pub struct VocabularyFilter<'a> {
    tokenizer: &'a dyn Tokenizer,
    stop_words: &'a StopWords,
}

impl<'a> VocabularyFilter<'a> {
    pub fn new(tokenizer: &'a dyn Tokenizer, stop_words: &'a StopWords) -> Self {
        Self {
            tokenizer,
            stop_words,
        }
    }

    /// Surviving tokens of `text`, joined by single spaces.
    pub fn filter_text(&self, text: &str) -> String {
        self.tokenizer
            .words(text)
            .into_iter()
            .filter(|token| !self.stop_words.contains(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Concatenates the filtered text of every plain-text message, in
    /// transcript order and without separators between messages.
    ///
    /// Messages with composite text do not contribute.
    pub fn build_corpus(&self, messages: &[Message]) -> String {
        let mut corpus = String::new();
        let mut contributing = 0usize;

        for message in messages {
            if let MessageText::Plain(text) = &message.text {
                corpus.push_str(&self.filter_text(text));
                contributing += 1;
            }
        }

        info!(
            "Built corpus of {} bytes from {} of {} messages",
            corpus.len(),
            contributing,
            messages.len()
        );
        corpus
    }
}

/// A word-cloud entry: the word, how often it occurs, and its size relative
/// to the most frequent word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordWeight {
    pub word: String,
    pub count: usize,
    pub weight: f64,
}

/// Counts whitespace-separated words and keeps the `max_words` most frequent.
/// Ties keep the order of first occurrence.
pub fn word_frequencies(blob: &str, max_words: usize) -> Vec<WordWeight> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for word in blob.split_whitespace() {
        match slots.get(word) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(max_words);

    let max_count = counts.first().map_or(1, |&(_, count)| count) as f64;
    counts
        .into_iter()
        .map(|(word, count)| WordWeight {
            word: word.to_string(),
            count,
            weight: count as f64 / max_count,
        })
        .collect()
}
