use crate::domain::TranscriptSegment;

/// Read-only view over a provider's native segment record.
pub trait SegmentSource {
    fn start(&self) -> Option<f64>;
    fn end(&self) -> Option<f64>;
    fn text(&self) -> Option<&str>;
}

/// Converts provider records into the canonical segment list.
///
/// Blank segments are dropped and the survivors are renumbered `1..=N` in
/// their original order. Offsets are clamped so that `0 <= start <= end`.
pub fn normalize_segments<S: SegmentSource>(raw: &[S]) -> Vec<TranscriptSegment> {
    raw.iter()
        .filter_map(|record| {
            let text = record.text().unwrap_or_default().trim();
            if text.is_empty() {
                return None;
            }

            let start_seconds = finite_or_zero(record.start()).max(0.0);
            let end_seconds = finite_or_zero(record.end()).max(start_seconds);

            Some((start_seconds, end_seconds, text.to_string()))
        })
        .enumerate()
        .map(|(position, (start_seconds, end_seconds, text))| TranscriptSegment {
            index: position as u32 + 1,
            start_seconds,
            end_seconds,
            text,
        })
        .collect()
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}
