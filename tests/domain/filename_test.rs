use whisperdesk::domain::{MAX_FILENAME_BYTES, UNNAMED_PLACEHOLDER, sanitize_filename};

#[test]
fn given_plain_name_when_sanitizing_then_returns_it_unchanged() {
    assert_eq!(sanitize_filename("lecture.mp3"), "lecture.mp3");
}

#[test]
fn given_path_traversal_when_sanitizing_then_separators_are_replaced() {
    let sanitized = sanitize_filename("../../etc/passwd.mp3");

    assert!(!sanitized.contains('/'));
    assert!(!sanitized.starts_with('.'));
    assert_eq!(sanitized, "_.._etc_passwd.mp3");
}

#[test]
fn given_windows_hazards_when_sanitizing_then_each_becomes_underscore() {
    assert_eq!(sanitize_filename("a<b>c:d\"e|f?g*h\\i.wav"), "a_b_c_d_e_f_g_h_i.wav");
}

#[test]
fn given_control_characters_when_sanitizing_then_they_are_removed() {
    assert_eq!(sanitize_filename("rec\u{0}ord\n.mp3"), "record.mp3");
}

#[test]
fn given_only_dots_and_spaces_when_sanitizing_then_returns_placeholder() {
    assert_eq!(sanitize_filename(" .. . "), UNNAMED_PLACEHOLDER);
    assert_eq!(sanitize_filename(""), UNNAMED_PLACEHOLDER);
}

#[test]
fn given_non_latin_name_when_sanitizing_then_script_is_preserved() {
    assert_eq!(sanitize_filename("会議の録音.m4a"), "会議の録音.m4a");
    assert_eq!(sanitize_filename("Запись урока.ogg"), "Запись урока.ogg");
}

#[test]
fn given_decomposed_accents_when_sanitizing_then_result_is_nfc() {
    let decomposed = "cafe\u{0301}.mp3";

    assert_eq!(sanitize_filename(decomposed), "caf\u{e9}.mp3");
}

#[test]
fn given_overlong_name_when_sanitizing_then_fits_budget_and_keeps_extension() {
    let raw = format!("{}.webm", "x".repeat(1_000));

    let sanitized = sanitize_filename(&raw);

    assert!(sanitized.len() <= MAX_FILENAME_BYTES);
    assert!(sanitized.ends_with(".webm"));
}

#[test]
fn given_any_input_when_sanitizing_twice_then_result_is_a_fixed_point() {
    let inputs = [
        "../secret.mp3".to_string(),
        "  spaced out .wav ".to_string(),
        "mixed/\\:*?.ogg".to_string(),
        "日本語のファイル名.mp4".to_string(),
        "...".to_string(),
        "tab\tname.m4a".to_string(),
        format!("😀.{}", "b".repeat(198)),
        format!("é.{}", "c".repeat(197)),
        format!("{}.{}", "名".repeat(80), "d".repeat(150)),
    ];

    for input in &inputs {
        let once = sanitize_filename(input);
        assert_eq!(sanitize_filename(&once), once, "input: {input:?}");
        assert!(!once.is_empty());
        assert!(once.len() <= MAX_FILENAME_BYTES, "input: {input:?}");
    }
}
