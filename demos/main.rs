use std::env;
use std::process;

use chat_stats::questions::QuestionDetector;
use chat_stats::replies::top_responders;
use chat_stats::tokenizer::RegexTokenizer;
use chat_stats::load_transcript;

fn main() {
    let args: Vec<String> = env::args().collect();
    let Some(file_path) = args.get(1) else {
        eprintln!("usage: main <telegram-export.json>");
        process::exit(2);
    };
    let transcript = load_transcript(file_path).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let detector = QuestionDetector::new(&RegexTokenizer);
    let responders = top_responders(&transcript.messages, &detector, usize::MAX);

    println!("Users by answered questions:");
    for responder in responders {
        println!("{}: {}", responder.sender, responder.replies);
    }
}
