use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chat_stats::vocabulary::StopWords;
use chat_stats::{
    ChatStatistics, MessageText, Pipeline, PngRenderer, Renderer, Responder, StatsError,
    StatsOptions, WeightsRenderer, WordCloudConfig, load_transcript, parse_str,
};
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};

const CHAT_EXAMPLE: &str = r#"{
    "name": "Support",
    "type": "public_supergroup",
    "id": 1001,
    "messages": [
        {"id": 1, "type": "message", "date": "2022-01-10T08:00:00", "from": "carol", "text": "Is this ok?"},
        {"id": 2, "type": "message", "date": "2022-01-10T08:05:00", "from": "alice", "text": "yes it is", "reply_to_message_id": 1},
        {"id": 3, "type": "message", "date": "2022-01-10T08:06:00", "from": "bob", "text": "the cat sat", "reply_to_message_id": 99},
        {"id": 4, "type": "message", "date": "2022-01-10T08:07:00", "from": "dave", "text": "This is fine.", "reply_to_message_id": 2}
    ]
}"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn transcript_file(value: serde_json::Value) -> NamedTempFile {
    write_temp(&value.to_string())
}

#[test]
fn test_parse_str_empty_messages() {
    let transcript = parse_str(r#"{"messages": []}"#).unwrap();
    assert!(transcript.messages.is_empty());
}

#[test]
fn test_parse_str_rejects_missing_messages() {
    assert!(matches!(parse_str(r#"{"name": "x"}"#), Err(StatsError::Parse(_))));
}

#[test]
fn test_load_reports_missing_transcript() {
    let stop_words = write_temp("the\n");
    let err = ChatStatistics::load("/definitely/not/here.json", stop_words.path())
        .err()
        .unwrap();
    match err {
        StatsError::Io { path, .. } => assert_eq!(path, PathBuf::from("/definitely/not/here.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_load_reports_missing_stop_words() {
    let transcript = write_temp(CHAT_EXAMPLE);
    let err = ChatStatistics::load(transcript.path(), "/no/stop_words.txt")
        .err()
        .unwrap();
    assert!(matches!(err, StatsError::Io { .. }));
    assert!(err.to_string().contains("/no/stop_words.txt"));
}

#[test]
fn test_load_reports_malformed_json() {
    let transcript = write_temp("{\"messages\": [");
    match load_transcript(transcript.path()) {
        Err(StatsError::Json { path, .. }) => assert_eq!(path, transcript.path()),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_load_reports_non_utf8_stop_words() {
    let transcript = write_temp(CHAT_EXAMPLE);
    let mut stop_words = NamedTempFile::new().unwrap();
    stop_words.write_all(&[0xff, 0xfe, b'\n']).unwrap();

    let err = ChatStatistics::load(transcript.path(), stop_words.path())
        .err()
        .unwrap();
    assert!(matches!(err, StatsError::Encoding { .. }));
}

#[test]
fn test_top_responders_excludes_dangling_and_statement_replies() {
    let transcript = write_temp(CHAT_EXAMPLE);
    let stop_words = write_temp("the\n");
    let stats = ChatStatistics::load(transcript.path(), stop_words.path()).unwrap();

    assert_eq!(stats.top_responders(10), vec![Responder::new("alice", 1)]);
}

#[test]
fn test_top_responders_minimal_transcript() {
    let transcript = parse_str(
        &json!({
            "messages": [
                {"id": 1, "text": "Is this ok?"},
                {"id": 2, "reply_to_id": 1, "from": "alice"},
                {"id": 3, "reply_to_id": 99, "from": "bob"},
            ]
        })
        .to_string(),
    )
    .unwrap();
    let stats = ChatStatistics::new(transcript, Pipeline::default(), StatsOptions::default());

    assert_eq!(stats.top_responders(10), vec![Responder::new("alice", 1)]);
}

#[test]
fn test_arabic_question_mark_counts() {
    let transcript = parse_str(
        &json!({
            "messages": [
                {"id": 1, "from": "sara", "text": "\u{0622}\u{06CC}\u{0627} \u{0627}\u{06CC}\u{0646} \u{062F}\u{0631}\u{0633}\u{062A} \u{0627}\u{0633}\u{062A}\u{061F}"},
                {"id": 2, "from": "reza", "text": "\u{0628}\u{0644}\u{0647}", "reply_to_message_id": 1},
            ]
        })
        .to_string(),
    )
    .unwrap();
    let stats = ChatStatistics::new(transcript, Pipeline::default(), StatsOptions::default());

    assert_eq!(stats.top_responders(10), vec![Responder::new("reza", 1)]);
}

#[test]
fn test_composite_question_counts() {
    let transcript = parse_str(
        &json!({
            "messages": [
                {"id": "q", "from": "sara", "text": ["did you read ", {"type": "link", "text": "the docs"}, "?"]},
                {"id": "a", "from": "reza", "text": "yes", "reply_to_message_id": "q"},
            ]
        })
        .to_string(),
    )
    .unwrap();
    let stats = ChatStatistics::new(transcript, Pipeline::default(), StatsOptions::default());

    assert_eq!(stats.top_responders(10), vec![Responder::new("reza", 1)]);
}

#[test]
fn test_top_n_truncation_is_deterministic() {
    let mut messages = Vec::new();
    let mut next_id = 1000;
    for q in 0..15 {
        messages.push(json!({"id": q, "from": "asker", "text": format!("question {q}?")}));
    }
    // user_i answers (i % 4) + 1 questions, so there are plenty of ties.
    for i in 0..15 {
        for q in 0..(i % 4) + 1 {
            messages.push(json!({
                "id": next_id,
                "from": format!("user_{i:02}"),
                "text": "answer",
                "reply_to_message_id": q,
            }));
            next_id += 1;
        }
    }
    let file = transcript_file(json!({ "messages": messages }));

    let run = || {
        let transcript = load_transcript(file.path()).unwrap();
        ChatStatistics::new(transcript, Pipeline::default(), StatsOptions::default()).top_responders(10)
    };
    let first = run();
    let second = run();

    assert_eq!(first.len(), 10);
    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| w[0].replies >= w[1].replies));
    // Ties keep first-seen order.
    let leaders: Vec<&str> = first.iter().take(3).map(|r| r.sender.as_str()).collect();
    assert_eq!(leaders, vec!["user_03", "user_07", "user_11"]);
    assert!(first.iter().all(|r| r.replies >= 2));
}

#[test]
fn test_build_corpus_filters_stop_words() {
    let transcript = write_temp(CHAT_EXAMPLE);
    let stop_words = write_temp("  the  \n\n?\n.\n");
    let stats = ChatStatistics::load(transcript.path(), stop_words.path()).unwrap();

    assert_eq!(stats.build_corpus(), "Is this okyes it iscat satThis is fine");
}

#[test]
fn test_build_corpus_is_idempotent() {
    let transcript = write_temp(CHAT_EXAMPLE);
    let stop_words = write_temp("the\n");
    let stats = ChatStatistics::load(transcript.path(), stop_words.path()).unwrap();

    let first = stats.build_corpus();
    let second = stats.build_corpus();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_build_corpus_skips_composite_text() {
    let transcript = parse_str(
        &json!({
            "messages": [
                {"id": 1, "text": "plain words"},
                {"id": 2, "text": ["rich ", {"type": "bold", "text": "words"}]},
            ]
        })
        .to_string(),
    )
    .unwrap();
    assert!(matches!(transcript.messages[1].text, MessageText::Composite(_)));

    let stats = ChatStatistics::new(transcript, Pipeline::default(), StatsOptions::default());
    assert_eq!(stats.build_corpus(), "plain words");
}

#[test]
fn test_generate_word_cloud_with_weights_renderer() {
    let transcript = parse_str(
        &json!({"messages": [{"id": 1, "text": "the cat sat, the cat ran. the cat"}]}).to_string(),
    )
    .unwrap();
    let pipeline = Pipeline::default();
    let stop_words = StopWords::from_lines(["the", ",", "."], pipeline.normalizer.as_ref());
    let stats = ChatStatistics::new(transcript, pipeline.with_stop_words(stop_words), StatsOptions::default());
    let out = TempDir::new().unwrap();

    let written = stats
        .generate_word_cloud(out.path().join("cloud"), &WeightsRenderer)
        .unwrap();
    assert_eq!(written, out.path().join("cloud").join("wordcloud.json"));

    let layout: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written).unwrap()).unwrap();
    assert_eq!(layout["config"]["max_font_size"], 200);
    assert_eq!(layout["words"][0]["word"], "cat");
    assert_eq!(layout["words"][0]["count"], 3);
    assert_eq!(layout["words"][0]["weight"], 1.0);
    assert_eq!(layout["words"][1]["word"], "sat");
    assert_eq!(layout["words"].as_array().unwrap().len(), 3);
}

#[test]
fn test_generate_word_cloud_writes_png() {
    let transcript = parse_str(
        &json!({"messages": [{"id": 1, "text": "the cat sat, the cat ran. the cat"}]}).to_string(),
    )
    .unwrap();
    let mut options = StatsOptions::default();
    options.word_cloud.width = 400;
    options.word_cloud.height = 240;
    options.word_cloud.max_font_size = 60;
    let stats = ChatStatistics::new(transcript, Pipeline::default(), options);
    let out = TempDir::new().unwrap();

    let written = stats
        .generate_word_cloud(out.path().join("cloud"), &PngRenderer)
        .unwrap();
    assert_eq!(written, out.path().join("cloud").join("wordcloud.png"));
    assert_eq!(image::image_dimensions(&written).unwrap(), (400, 240));

    let decoded = image::open(&written).unwrap().to_rgb8();
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255]);
    assert!(decoded.pixels().any(|p| p.0 != [255, 255, 255]));
}

struct RecordingRenderer;

impl Renderer for RecordingRenderer {
    fn render(&self, blob: &str, config: &WordCloudConfig, output: &Path) -> chat_stats::Result<PathBuf> {
        if config.width == 0 {
            return Err(StatsError::Render("empty canvas".to_string()));
        }
        fs::write(output, blob).map_err(|e| StatsError::Render(e.to_string()))?;
        Ok(output.to_path_buf())
    }
}

#[test]
fn test_generate_word_cloud_hands_display_text_to_renderer() {
    let transcript = parse_str(
        &json!({"messages": [{"id": 1, "text": "  \u{0633}\u{0644}\u{0627}\u{0645}   \u{062F}\u{0646}\u{06CC}\u{0627} "}]}).to_string(),
    )
    .unwrap();
    let stats = ChatStatistics::new(transcript, Pipeline::default(), StatsOptions::default());
    let out = TempDir::new().unwrap();

    let written = stats.generate_word_cloud(out.path(), &RecordingRenderer).unwrap();
    assert_eq!(written, out.path().join("wordcloud.png"));
    // Both words reversed, in reverse order.
    assert_eq!(
        fs::read_to_string(&written).unwrap(),
        "\u{0627}\u{06CC}\u{0646}\u{062F} \u{0645}\u{0627}\u{0644}\u{0633}"
    );
}

#[test]
fn test_generate_word_cloud_surfaces_renderer_errors() {
    let transcript = parse_str(r#"{"messages": [{"id": 1, "text": "hello"}]}"#).unwrap();
    let mut options = StatsOptions::default();
    options.word_cloud.width = 0;
    let stats = ChatStatistics::new(transcript, Pipeline::default(), options);
    let out = TempDir::new().unwrap();

    let err = stats.generate_word_cloud(out.path(), &RecordingRenderer).unwrap_err();
    assert!(matches!(err, StatsError::Render(_)));
}

#[test]
fn test_summary() {
    let transcript = write_temp(CHAT_EXAMPLE);
    let stop_words = write_temp("");
    let stats = ChatStatistics::load(transcript.path(), stop_words.path()).unwrap();
    let summary = stats.summary();

    assert_eq!(summary.name.as_deref(), Some("Support"));
    assert_eq!(summary.messages, 4);
    assert_eq!(summary.senders, 4);
    assert_eq!(summary.questions, 1);
    assert_eq!(summary.replies, 3);
    assert!(summary.first < summary.last);
}
