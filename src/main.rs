use std::path::PathBuf;
use std::process::ExitCode;

use chat_stats::{
    ChatStatistics, Pipeline, PngRenderer, Renderer, StatsOptions, WeightsRenderer,
    load_transcript,
};
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chat-stats",
    about = "Question-answer statistics and word clouds for Telegram chat exports",
    version
)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the members who answered the most questions
    Responders {
        #[command(flatten)]
        input: Input,
        /// Number of members to list
        #[arg(short, long, default_value = "10")]
        top: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Build the word cloud for a chat
    Wordcloud {
        #[command(flatten)]
        input: Input,
        /// Directory receiving the word cloud
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "1200")]
        width: u32,
        #[arg(long, default_value = "1200")]
        height: u32,
        #[arg(long, default_value = "200")]
        max_font_size: u32,
        #[arg(long, default_value = "white")]
        background: String,
        /// Font file able to render the chat's script
        #[arg(long)]
        font: Option<PathBuf>,
        /// Write the weighted word list as JSON instead of a PNG
        #[arg(long)]
        weights: bool,
    },
    /// Print message, question and reply counts as JSON
    Summary {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    /// Path to the Telegram JSON export
    transcript: PathBuf,
    /// Newline-delimited stop word list
    #[arg(short, long)]
    stop_words: Option<PathBuf>,
}

impl Input {
    fn load(&self, options: StatsOptions) -> chat_stats::Result<ChatStatistics> {
        let mut pipeline = Pipeline::default();
        if let Some(path) = &self.stop_words {
            pipeline = pipeline.load_stop_words(path)?;
        }
        let transcript = load_transcript(&self.transcript)?;
        Ok(ChatStatistics::new(transcript, pipeline, options))
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> chat_stats::Result<()> {
    match cli.command {
        Commands::Responders { input, top, json } => {
            let stats = input.load(StatsOptions {
                top_n: top,
                ..Default::default()
            })?;
            let responders = stats.top_responders(stats.options().top_n);
            if json {
                println!("{}", serde_json::to_string_pretty(&responders)?);
            } else {
                for (rank, responder) in responders.iter().enumerate() {
                    println!("{:>3}. {}: {}", rank + 1, responder.sender, responder.replies);
                }
            }
        }
        Commands::Wordcloud {
            input,
            output,
            width,
            height,
            max_font_size,
            background,
            font,
            weights,
        } => {
            let mut options = StatsOptions::default();
            options.word_cloud.width = width;
            options.word_cloud.height = height;
            options.word_cloud.max_font_size = max_font_size;
            options.word_cloud.background_color = background;
            options.word_cloud.font_path = font;

            let stats = input.load(options)?;
            let renderer: &dyn Renderer = if weights {
                &WeightsRenderer
            } else {
                &PngRenderer
            };
            let written = stats.generate_word_cloud(&output, renderer)?;
            println!("{}", written.display());
        }
        Commands::Summary { input } => {
            let stats = input.load(StatsOptions::default())?;
            println!("{}", serde_json::to_string_pretty(&stats.summary())?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
