
pub mod error;
pub mod models;
pub mod normalizer;
pub mod questions;
pub mod raster;
pub mod reconstruct;
pub mod render;
pub mod replies;
pub mod stats;
pub mod tokenizer;
pub mod vocabulary;

pub use crate::error::{Result, StatsError};
pub use crate::models::{Fragment, Message, MessageId, MessageText, StatsOptions, Transcript};
pub use crate::raster::PngRenderer;
pub use crate::render::{Renderer, WeightsRenderer, WordCloudConfig};
pub use crate::replies::Responder;
pub use crate::stats::{ChatStatistics, Pipeline, TranscriptSummary};

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::info;

/// Parses a chat export held in memory.
pub fn parse_str(s: &str) -> Result<Transcript> {
    Ok(serde_json::from_str(s)?)
}

/// Memory-maps a chat export and deserializes it without copying the file
/// into an intermediate `String`.
///
/// The mapping and the file handle are released before returning, on success
/// and on error alike.
pub fn load_transcript<P: AsRef<Path>>(path: P) -> Result<Transcript> {
    let path = path.as_ref();
    info!("Loading chat data from {}", path.display());

    let file = File::open(path).map_err(|e| StatsError::io(path, e))?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| StatsError::io(path, e))?;
    let transcript: Transcript =
        serde_json::from_slice(&mmap).map_err(|e| StatsError::json(path, e))?;

    info!("Loaded {} messages", transcript.messages.len());
    Ok(transcript)
}
