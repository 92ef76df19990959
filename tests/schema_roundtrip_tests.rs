#![cfg(feature = "schema")]

use std::io::{Cursor, Read};
use transflow::schema::{json_to_schema, schema_to_json};
use transflow::*;

mod harness {
    pub mod record;
}
use harness::record::{Group, Record};

const HELLO: &str = r#"{"label":"hello","type":17,"reps":[1,2,3,4],"optionalgroup":{"requiredField":"good bye"}}"#;
const MORE: &str = r#"{"label":"hola","type":2} {"label":"aloha","reps":[-5],"optionalgroup":{"requiredField":"a hui hou"}}"#;

fn drain<R: Read>(mut r: R) -> Vec<u8> {
    let mut out = Vec::new();
    r.read_to_end(&mut out).unwrap();
    out
}

fn parse_all(json: &[u8]) -> Vec<Record> {
    serde_json::Deserializer::from_slice(json)
        .into_iter::<Record>()
        .map(|r| r.unwrap())
        .collect()
}

#[test]
fn single_message_round_trip() {
    let binary = drain(json_to_schema::<Record, _, _>(Cursor::new(HELLO), Unframed));
    assert!(!binary.is_empty());

    let json = drain(schema_to_json::<Record, _, _>(Cursor::new(binary), Unframed));
    let expected: serde_json::Value = serde_json::from_str(HELLO).unwrap();
    let actual: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn delimited_messages_round_trip() {
    let input = format!("{HELLO}\n{MORE}");
    let mut t = json_to_schema::<Record, _, _>(Cursor::new(input.clone()), VarintDelimited);
    let mut frames = 0;
    let mut binary = Vec::new();
    t.process_all(|frame| {
        frames += 1;
        binary.extend_from_slice(frame);
        Ok(())
    })
    .unwrap();
    assert_eq!(frames, 3);

    let json = drain(schema_to_json::<Record, _, _>(Cursor::new(binary), VarintDelimited));
    let records = parse_all(&json);
    assert_eq!(records, parse_all(input.as_bytes()));
    assert_eq!(
        records[0].group,
        Some(Group {
            required_field: "good bye".to_string()
        })
    );
    assert_eq!(records[1].reps, Vec::<i64>::new());
}

#[test]
fn unframed_refuses_second_message() {
    let mut t = json_to_schema::<Record, _, _>(Cursor::new(format!("{HELLO} {HELLO}")), Unframed);

    let first = t.read_message().unwrap();
    assert!(!first.payload.is_empty());
    assert!(first.terminal.is_none());

    let second = t.read_message().unwrap();
    assert!(second.payload.is_empty());
    assert!(matches!(
        second.terminal,
        Some(Terminal::Failed(Error::NotMultiMessage))
    ));
}

#[test]
fn empty_unframed_input_is_end_of_data() {
    let mut t = schema_to_json::<Record, _, _>(Cursor::new(Vec::new()), Unframed);
    let m = t.read_message().unwrap();
    assert!(m.payload.is_empty());
    assert!(m.is_end());
}

#[test]
fn truncated_frame_fails_after_complete_ones() {
    let mut binary = drain(json_to_schema::<Record, _, _>(Cursor::new(MORE), VarintDelimited));
    binary.pop();

    let mut t = schema_to_json::<Record, _, _>(Cursor::new(binary), VarintDelimited);
    let mut messages = t.messages();
    let first = messages.next().unwrap().map(parse_all);
    assert_eq!(first.unwrap()[0].label, "hola");
    assert!(matches!(messages.next(), Err(Error::UnexpectedEof)));
}

#[test]
fn corrupt_payload_fails_verification() {
    let mut binary = Vec::new();
    VarintDelimited.frame(&mut binary, &[0xFF; 8]).unwrap();

    let mut t = schema_to_json::<Record, _, _>(Cursor::new(binary), VarintDelimited);
    let mut out = Vec::new();
    let err = t.read_to_end(&mut out).unwrap_err();
    assert!(out.is_empty());
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(matches!(Error::from(err), Error::FlatbuffersError(_)));
}

#[test]
fn bounded_framing_rejects_large_messages() {
    let mut t = json_to_schema::<Record, _, _>(Cursor::new(HELLO), VarintDelimited.bounded(8));
    let m = t.read_message().unwrap();
    assert!(matches!(
        m.terminal.and_then(Terminal::error),
        Some(Error::InvalidFrame { limit: Some(8), .. })
    ));
}

#[test]
fn malformed_json_is_reported() {
    let mut t = json_to_schema::<Record, _, _>(Cursor::new(r#"{"label": 5}"#), VarintDelimited);
    let m = t.read_message().unwrap();
    assert!(matches!(
        m.terminal.and_then(Terminal::error),
        Some(Error::Json(_))
    ));
}
