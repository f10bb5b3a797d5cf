use std::fs;
use std::path::PathBuf;

use nebula_terminal::feed_fetch::parse_dictionary_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_records_fixture_in_document_order() {
    let raw = read_fixture("records.json");
    let records = parse_dictionary_json(&raw).expect("fixture should parse");
    assert_eq!(records.len(), 6);
    let keys: Vec<&str> = records.keys().collect();
    assert_eq!(
        keys[0],
        "https://fbref.example/matches/zeta-city-v-alpha-united"
    );
    assert_eq!(keys[5], "https://fbref.example/matches/leeds-v-hull");
    let row = records
        .get("https://fbref.example/matches/ajax-v-psv")
        .expect("ajax row");
    assert_eq!(row.first().map(String::as_str), Some("Over"));
    assert_eq!(row.last().map(String::as_str), Some("PSV"));
}

#[test]
fn parses_reference_fixture() {
    let raw = read_fixture("reference_key.json");
    let reference = parse_dictionary_json(&raw).expect("fixture should parse");
    assert_eq!(reference.len(), 5);
    let row = reference
        .get("https://fbref.example/matches/leeds-v-hull")
        .expect("leeds row");
    assert_eq!(row[2], "Premier League");
    assert_eq!(row[3], "12:00 PM");
    assert!(!reference.contains_key("https://fbref.example/matches/unlisted-v-unknown"));
}

#[test]
fn null_document_is_rejected_but_empty_object_is_not() {
    assert!(parse_dictionary_json("null").is_err());
    let dict = parse_dictionary_json(" {} ").expect("empty object should parse");
    assert!(dict.is_empty());
}

#[test]
fn rejects_documents_with_the_wrong_shape() {
    for raw in [
        "",
        "null",
        "[]",
        "not json",
        r#"{"a": "Over"}"#,
        r#"{"a": ["Over", 2]}"#,
        r#"{"a": null}"#,
        r#"{"a": ["Over"],"#,
    ] {
        assert!(
            parse_dictionary_json(raw).is_err(),
            "{raw:?} should be rejected"
        );
    }
}

#[test]
fn duplicate_key_keeps_first_position_and_last_value() {
    let dict = parse_dictionary_json(r#"{"a": ["1"], "b": ["2"], "a": ["3"]}"#)
        .expect("duplicates should parse");
    let keys: Vec<&str> = dict.keys().collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(dict.get("a"), Some(&["3".to_string()][..]));
}
