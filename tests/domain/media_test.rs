use whisperdesk::domain::{AllowedExtensions, MediaExtension, MediaFilename, ValidationError};

#[test]
fn given_allowed_upper_case_extension_when_parsing_then_extension_is_lowercased() {
    let filename = MediaFilename::parse("Talk.MP3", &AllowedExtensions::default()).unwrap();

    assert_eq!(filename.raw, "Talk.MP3");
    assert_eq!(filename.sanitized, "Talk.MP3");
    assert_eq!(filename.extension.as_str(), "mp3");
}

#[test]
fn given_empty_name_when_parsing_then_returns_missing_filename() {
    let result = MediaFilename::parse("   ", &AllowedExtensions::default());

    assert_eq!(result, Err(ValidationError::MissingFilename));
}

#[test]
fn given_name_without_extension_when_parsing_then_returns_missing_extension() {
    let result = MediaFilename::parse("recording", &AllowedExtensions::default());

    assert_eq!(result, Err(ValidationError::MissingExtension));
}

#[test]
fn given_disallowed_extension_when_parsing_then_returns_unsupported_extension() {
    let result = MediaFilename::parse("notes.txt", &AllowedExtensions::default());

    assert_eq!(
        result,
        Err(ValidationError::UnsupportedExtension("txt".to_string()))
    );
}

#[test]
fn given_hostile_name_when_parsing_then_extension_comes_from_sanitized_name() {
    let filename = MediaFilename::parse("../../evil.wav", &AllowedExtensions::default()).unwrap();

    assert!(!filename.sanitized.contains('/'));
    assert_eq!(filename.extension.as_str(), "wav");
}

#[test]
fn given_custom_list_when_checking_then_dots_and_case_are_ignored() {
    let allowed = AllowedExtensions::new([".FLAC", "opus"]);

    assert!(allowed.contains(&MediaExtension::new("flac")));
    assert!(allowed.contains(&MediaExtension::new("OPUS")));
    assert!(!allowed.contains(&MediaExtension::new("mp3")));
}

#[test]
fn given_known_extensions_when_mapping_content_type_then_returns_mime() {
    assert_eq!(MediaExtension::new("mp3").content_type(), "audio/mpeg");
    assert_eq!(MediaExtension::new("mkv").content_type(), "video/x-matroska");
    assert_eq!(
        MediaExtension::new("xyz").content_type(),
        "application/octet-stream"
    );
}
