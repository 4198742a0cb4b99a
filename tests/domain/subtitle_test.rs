use whisperdesk::domain::{
    SubtitleDocument, TranscriptSegment, format_timestamp, subtitle_filename,
};

fn segment(index: u32, start: f64, end: f64, text: &str) -> TranscriptSegment {
    TranscriptSegment {
        index,
        start_seconds: start,
        end_seconds: end,
        text: text.to_string(),
    }
}

#[test]
fn given_zero_or_missing_offset_when_formatting_then_returns_zero_timestamp() {
    assert_eq!(format_timestamp(Some(0.0)), "00:00:00,000");
    assert_eq!(format_timestamp(None), "00:00:00,000");
    assert_eq!(format_timestamp(Some(f64::NAN)), "00:00:00,000");
}

#[test]
fn given_fractional_offset_when_formatting_then_millis_are_truncated() {
    assert_eq!(format_timestamp(Some(1.2)), "00:00:01,200");
    assert_eq!(format_timestamp(Some(3.9999)), "00:00:03,999");
    assert_eq!(format_timestamp(Some(3725.042)), "01:02:05,042");
}

#[test]
fn given_segments_when_rendering_then_cues_are_separated_by_blank_lines() {
    let segments = vec![
        segment(1, 0.0, 1.2, "Hello"),
        segment(2, 2.0, 3.5, "World"),
    ];

    let document = SubtitleDocument::render(&segments);

    assert_eq!(
        document.as_str(),
        "1\n00:00:00,000 --> 00:00:01,200\nHello\n\n2\n00:00:02,000 --> 00:00:03,500\nWorld"
    );
}

#[test]
fn given_no_segments_when_rendering_then_document_is_empty() {
    let document = SubtitleDocument::render(&[]);

    assert!(document.is_empty());
}

#[test]
fn given_media_filename_when_deriving_subtitle_name_then_extension_is_swapped() {
    assert_eq!(subtitle_filename("lecture.mp4"), "lecture.srt");
    assert_eq!(subtitle_filename("noext"), "noext.srt");
    assert_eq!(subtitle_filename("a.b.wav"), "a.b.srt");
}
