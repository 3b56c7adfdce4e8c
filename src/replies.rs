use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::Message;
use crate::questions::{QuestionDetector, QuestionIndex};

/// A sender and the number of questions they answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Responder {
    pub sender: String,
    pub replies: usize,
}

impl Responder {
    pub fn new(sender: impl Into<String>, replies: usize) -> Self {
        Self {
            sender: sender.into(),
            replies,
        }
    }
}

/// Per-sender reply counts, remembering the order senders were first seen in.
#[derive(Debug, Clone, Default)]
pub struct ResponseTally {
    slots: HashMap<String, usize>,
    entries: Vec<Responder>,
}

impl ResponseTally {
    pub fn record(&mut self, sender: &str) {
        match self.slots.get(sender) {
            Some(&slot) => self.entries[slot].replies += 1,
            None => {
                self.slots.insert(sender.to_string(), self.entries.len());
                self.entries.push(Responder::new(sender, 1));
            }
        }
    }

    pub fn get(&self, sender: &str) -> usize {
        self.slots
            .get(sender)
            .map_or(0, |&slot| self.entries[slot].replies)
    }

    /// Number of distinct senders with at least one counted reply.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|r| r.replies).sum()
    }

    /// The `top_n` senders by descending count. Ties keep first-seen order.
    pub fn ranked(&self, top_n: usize) -> Vec<Responder> {
        let mut ranked = self.entries.clone();
        // stable: equal counts stay in first-seen order
        ranked.sort_by(|a, b| b.replies.cmp(&a.replies));
        ranked.truncate(top_n);
        ranked
    }
}

/// Counts replies to questions, per sender.
pub struct ReplyAttributor<'a> {
    index: &'a QuestionIndex,
}

impl<'a> ReplyAttributor<'a> {
    pub fn new(index: &'a QuestionIndex) -> Self {
        Self { index }
    }

    /// Second pass over the transcript. Only replies whose target is a known
    /// question are counted; replies to anything else, including ids absent
    /// from the transcript, are ignored.
    pub fn tally(&self, messages: &[Message]) -> ResponseTally {
        let mut tally = ResponseTally::default();

        for message in messages {
            let Some(target) = &message.reply_to_id else {
                continue;
            };
            if !self.index.is_question(target) {
                continue;
            }
            match &message.sender {
                Some(sender) => tally.record(sender),
                None => debug!("Reply {} to question {} has no sender", message.id, target),
            }
        }

        tally
    }
}

/// Builds the question index, tallies replies and returns the `top_n` responders.
pub fn top_responders(
    messages: &[Message],
    detector: &QuestionDetector<'_>,
    top_n: usize,
) -> Vec<Responder> {
    let index = QuestionIndex::build(messages, detector);
    let tally = ReplyAttributor::new(&index).tally(messages);

    info!(
        "Found {} questions and {} answers from {} senders",
        index.question_count(),
        tally.total(),
        tally.len()
    );

    tally.ranked(top_n)
}
