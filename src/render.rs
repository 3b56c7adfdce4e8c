//! Hand-off to word-cloud rendering.
//!
//! Rasterization lives behind the [`Renderer`] trait; see
//! [`crate::raster::PngRenderer`]. This module prepares what a renderer
//! consumes: the corpus in display order and the canvas settings.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use unicode_bidi::BidiInfo;

use crate::error::{Result, StatsError};
use crate::normalizer::Normalizer;
use crate::vocabulary::{WordWeight, word_frequencies};

/// File name of the rendered image inside the output directory.
pub const WORD_CLOUD_FILE: &str = "wordcloud.png";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCloudConfig {
    pub width: u32,
    pub height: u32,
    pub max_font_size: u32,
    pub background_color: String,
    /// Font able to render the chat's script. Renderer default when `None`.
    pub font_path: Option<PathBuf>,
    pub max_words: usize,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 1200,
            max_font_size: 200,
            background_color: "white".to_string(),
            font_path: None,
            max_words: 200,
        }
    }
}

/// Turns a display-ordered text blob into a word-cloud artifact.
pub trait Renderer {
    /// Renders `blob` for the canvas in `config`, targeting `output`.
    /// Returns the path actually written.
    fn render(&self, blob: &str, config: &WordCloudConfig, output: &Path) -> Result<PathBuf>;
}

/// Normalizes the corpus and reorders it for display, so right-to-left runs
/// read correctly when drawn left to right.
pub fn display_text(corpus: &str, normalizer: &dyn Normalizer) -> String {
    let normalized = normalizer.normalize(corpus);
    let bidi = BidiInfo::new(&normalized, None);

    let mut out = String::with_capacity(normalized.len());
    for paragraph in &bidi.paragraphs {
        let line = paragraph.range.clone();
        out.push_str(&bidi.reorder_line(paragraph, line));
    }
    out
}

#[derive(Serialize)]
struct WordCloudLayout<'a> {
    config: &'a WordCloudConfig,
    words: Vec<WordWeight>,
}

/// Writes the weighted word list and canvas settings as JSON next to the
/// requested image path (`wordcloud.json`), for an external rasterizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightsRenderer;

impl Renderer for WeightsRenderer {
    fn render(&self, blob: &str, config: &WordCloudConfig, output: &Path) -> Result<PathBuf> {
        let path = output.with_extension("json");
        let layout = WordCloudLayout {
            config,
            words: word_frequencies(blob, config.max_words),
        };

        let file = File::create(&path).map_err(|e| StatsError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &layout).map_err(|e| StatsError::json(&path, e))?;
        writer.flush().map_err(|e| StatsError::io(&path, e))?;

        info!("Wrote {} words to {}", layout.words.len(), path.display());
        Ok(path)
    }
}

/// Renders into `output_dir/wordcloud.png`, creating the directory if needed.
pub fn render_to_dir(
    renderer: &dyn Renderer,
    blob: &str,
    config: &WordCloudConfig,
    output_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|e| StatsError::io(output_dir, e))?;
    let output = output_dir.join(WORD_CLOUD_FILE);
    info!("Saving word cloud to {}", output.display());
    renderer.render(blob, config, &output)
}
