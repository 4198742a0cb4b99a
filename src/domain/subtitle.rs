use super::TranscriptSegment;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

// Absorbs binary representation error (1.2 * 1000 must not land on 1199).
const TRUNCATION_EPSILON_MS: f64 = 1e-6;

/// Formats an offset as `HH:MM:SS,mmm`.
///
/// Missing, negative or non-finite offsets render as zero. Sub-millisecond
/// precision is truncated and hours are not wrapped at 100.
pub fn format_timestamp(seconds: Option<f64>) -> String {
    let total_ms = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => {
            (s * MILLIS_PER_SECOND as f64 + TRUNCATION_EPSILON_MS).floor() as u64
        }
        _ => 0,
    };

    let hours = total_ms / MILLIS_PER_HOUR;
    let minutes = (total_ms % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    let secs = (total_ms % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
    let millis = total_ms % MILLIS_PER_SECOND;

    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Rendered SubRip document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleDocument {
    body: String,
}

impl SubtitleDocument {
    pub fn render(segments: &[TranscriptSegment]) -> Self {
        let body = segments
            .iter()
            .map(|segment| {
                format!(
                    "{}\n{} --> {}\n{}",
                    segment.index,
                    format_timestamp(Some(segment.start_seconds)),
                    format_timestamp(Some(segment.end_seconds)),
                    segment.text.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Self { body }
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

/// Swaps the media extension for `.srt`.
pub fn subtitle_filename(media_filename: &str) -> String {
    let stem = match media_filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => media_filename,
    };
    format!("{stem}.srt")
}
