use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::load_transcript;
use crate::models::{StatsOptions, Transcript};
use crate::normalizer::{Normalizer, PersianNormalizer};
use crate::questions::{QuestionDetector, QuestionIndex};
use crate::render::{Renderer, display_text, render_to_dir};
use crate::replies::{Responder, top_responders};
use crate::tokenizer::{RegexTokenizer, Tokenizer};
use crate::vocabulary::{StopWords, VocabularyFilter};

/// Text collaborators shared by every stage of a run.
pub struct Pipeline {
    pub normalizer: Box<dyn Normalizer>,
    pub tokenizer: Box<dyn Tokenizer>,
    pub stop_words: StopWords,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            normalizer: Box::new(PersianNormalizer::default()),
            tokenizer: Box::new(RegexTokenizer),
            stop_words: StopWords::default(),
        }
    }
}

impl Pipeline {
    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Loads the stop word list through this pipeline's normalizer.
    pub fn load_stop_words<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let stop_words = StopWords::load(path, self.normalizer.as_ref())?;
        Ok(self.with_stop_words(stop_words))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSummary {
    pub name: Option<String>,
    pub messages: usize,
    pub senders: usize,
    pub questions: usize,
    pub replies: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

/// Statistics over one loaded chat export.
pub struct ChatStatistics {
    transcript: Transcript,
    pipeline: Pipeline,
    options: StatsOptions,
}

impl ChatStatistics {
    pub fn new(transcript: Transcript, pipeline: Pipeline, options: StatsOptions) -> Self {
        Self {
            transcript,
            pipeline,
            options,
        }
    }

    /// Loads a transcript and a stop word list with the default pipeline.
    pub fn load<P, S>(transcript_path: P, stopwords_path: S) -> Result<Self>
    where
        P: AsRef<Path>,
        S: AsRef<Path>,
    {
        let pipeline = Pipeline::default().load_stop_words(stopwords_path)?;
        let transcript = load_transcript(transcript_path)?;
        Ok(Self::new(transcript, pipeline, StatsOptions::default()))
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn options(&self) -> &StatsOptions {
        &self.options
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn detector(&self) -> QuestionDetector<'_> {
        QuestionDetector::new(self.pipeline.tokenizer.as_ref())
    }

    pub fn question_index(&self) -> QuestionIndex {
        QuestionIndex::build(&self.transcript.messages, &self.detector())
    }

    /// The `top_n` senders who answered the most questions.
    pub fn top_responders(&self, top_n: usize) -> Vec<Responder> {
        top_responders(&self.transcript.messages, &self.detector(), top_n)
    }

    /// Stop-word filtered text of all plain-text messages.
    pub fn build_corpus(&self) -> String {
        VocabularyFilter::new(self.pipeline.tokenizer.as_ref(), &self.pipeline.stop_words)
            .build_corpus(&self.transcript.messages)
    }

    /// Builds the corpus, reorders it for display and hands it to `renderer`,
    /// targeting `output_dir/wordcloud.png`.
    pub fn generate_word_cloud<P: AsRef<Path>>(
        &self,
        output_dir: P,
        renderer: &dyn Renderer,
    ) -> Result<PathBuf> {
        info!("Generating word cloud...");
        let corpus = self.build_corpus();
        let blob = display_text(&corpus, self.pipeline.normalizer.as_ref());
        render_to_dir(renderer, &blob, &self.options.word_cloud, output_dir.as_ref())
    }

    pub fn summary(&self) -> TranscriptSummary {
        let messages = &self.transcript.messages;
        let senders: HashSet<&str> = messages
            .iter()
            .filter_map(|m| m.sender.as_deref())
            .collect();
        let dates: Vec<NaiveDateTime> = messages.iter().filter_map(|m| m.sent_at()).collect();

        TranscriptSummary {
            name: self.transcript.name.clone(),
            messages: messages.len(),
            senders: senders.len(),
            questions: self.question_index().question_count(),
            replies: messages.iter().filter(|m| m.reply_to_id.is_some()).count(),
            first: dates.iter().min().copied(),
            last: dates.iter().max().copied(),
        }
    }
}
