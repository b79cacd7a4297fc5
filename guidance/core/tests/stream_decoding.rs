//! Event-stream decoding across awkward chunk boundaries

use guidance_core::{DecodeError, DecodeEvent, DecoderLimits, StreamDecoder};
use pretty_assertions::assert_eq;

fn data_line(content: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
    )
}

fn updates(events: &[DecodeEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            DecodeEvent::Update { content, .. } => Some(content.as_str()),
            DecodeEvent::Done => None,
        })
        .collect()
}

#[test]
fn test_payload_split_mid_json() {
    let mut decoder = StreamDecoder::default();

    let first = decoder
        .feed(br#"data: {"choices":[{"delta":{"content":"Hel"#)
        .unwrap();
    assert!(first.is_empty());

    let second = decoder
        .feed(b"lo\"}}]}\n\ndata: [DONE]\n")
        .unwrap();
    assert_eq!(
        second,
        vec![
            DecodeEvent::Update {
                delta: "Hello".to_string(),
                content: "Hello".to_string()
            },
            DecodeEvent::Done,
        ]
    );
    assert!(decoder.is_done());

    let outcome = decoder.finish().unwrap();
    assert_eq!(outcome.content, "Hello");
    assert!(!outcome.truncated);
}

#[test]
fn test_line_break_inside_payload_is_retried() {
    let mut decoder = StreamDecoder::default();

    // The break makes the first half look like a complete line
    let first = decoder
        .feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\n")
        .unwrap();
    assert!(first.is_empty());

    let second = decoder.feed(b"lo\"}}]}\n").unwrap();
    assert_eq!(updates(&second), vec!["Hello"]);
    assert_eq!(decoder.content(), "Hello");
}

#[test]
fn test_heartbeat_is_ignored() {
    let mut decoder = StreamDecoder::default();
    let events = decoder.feed(b": heartbeat\n").unwrap();
    assert!(events.is_empty());
    assert_eq!(decoder.content(), "");

    let body = format!(": heartbeat\n{}: ping\n", data_line("ok"));
    let events = decoder.feed(body.as_bytes()).unwrap();
    assert_eq!(updates(&events), vec!["ok"]);
}

#[test]
fn test_deltas_concatenate() {
    let mut decoder = StreamDecoder::default();
    let body = format!("{}{}", data_line("A"), data_line("B"));
    let events = decoder.feed(body.as_bytes()).unwrap();

    assert_eq!(
        events,
        vec![
            DecodeEvent::Update {
                delta: "A".to_string(),
                content: "A".to_string()
            },
            DecodeEvent::Update {
                delta: "B".to_string(),
                content: "AB".to_string()
            },
        ]
    );
}

#[test]
fn test_multibyte_character_split_across_chunks() {
    let body = data_line("₹500");
    let bytes = body.as_bytes();
    // The rupee sign is three bytes; cut after the first two
    let start = body.find('₹').unwrap();
    let (head, tail) = bytes.split_at(start + 2);

    let mut decoder = StreamDecoder::default();
    assert!(decoder.feed(head).unwrap().is_empty());
    let events = decoder.feed(tail).unwrap();
    assert_eq!(updates(&events), vec!["₹500"]);
    assert!(!decoder.content().contains('\u{FFFD}'));
}

#[test]
fn test_every_single_byte_split_gives_the_same_content() {
    let body = format!(
        ": hi\r\n{}{}{}data: [DONE]\n",
        data_line("Namaste "),
        data_line("दुनिया"),
        data_line("!")
    );
    let mut decoder = StreamDecoder::default();
    for byte in body.as_bytes() {
        decoder.feed(std::slice::from_ref(byte)).unwrap();
    }
    let outcome = decoder.finish().unwrap();
    assert_eq!(outcome.content, "Namaste दुनिया!");
    assert!(!outcome.truncated);
}

#[test]
fn test_retry_budget_turns_into_an_error() {
    let mut decoder = StreamDecoder::new(DecoderLimits {
        max_retries: 2,
        ..DecoderLimits::default()
    });
    decoder.feed(data_line("kept").as_bytes()).unwrap();

    assert!(decoder.feed(b"data: {broken\n").unwrap().is_empty());
    assert!(decoder.feed(b"\n").unwrap().is_empty());
    let err = decoder.feed(b"\n").unwrap_err();

    assert_eq!(
        err,
        DecodeError::MalformedLine {
            attempts: 3,
            preview: "{broken".to_string()
        }
    );
    assert_eq!(decoder.content(), "kept");
}

#[test]
fn test_successful_line_resets_the_retry_budget() {
    let mut decoder = StreamDecoder::new(DecoderLimits {
        max_retries: 1,
        ..DecoderLimits::default()
    });
    for word in ["one ", "two ", "three"] {
        let line = data_line(word);
        let (head, tail) = line.split_at(line.len() / 2);
        // Insert a stray break so each line fails once before completing
        decoder.feed(format!("{head}\n").as_bytes()).unwrap();
        decoder.feed(tail.as_bytes()).unwrap();
    }
    assert_eq!(decoder.content(), "one two three");
}

#[test]
fn test_truncated_stream_is_reported() {
    let mut decoder = StreamDecoder::default();
    let body = format!("{}data: {{\"choi", data_line("partial answer"));
    decoder.feed(body.as_bytes()).unwrap();

    let outcome = decoder.finish().unwrap();
    assert!(outcome.truncated);
    assert!(outcome.events.is_empty());
    assert_eq!(outcome.content, "partial answer");
}

#[test]
fn test_finish_retries_held_back_lines() {
    let mut decoder = StreamDecoder::default();
    // Two lines in one chunk, the first split by a stray break
    decoder
        .feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\n\"}}]}\n")
        .unwrap();
    let outcome = decoder.finish().unwrap();
    assert_eq!(updates(&outcome.events), vec!["a"]);
    assert!(!outcome.truncated);
}
