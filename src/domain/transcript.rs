#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub index: u32,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptResult {
    pub full_text: String,
    pub language_code: String,
    pub segments: Vec<TranscriptSegment>,
}

impl TranscriptResult {
    /// Uses the provider's own text when it has any, otherwise joins the
    /// segment texts.
    pub fn from_parts(
        provider_text: &str,
        language_code: String,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        let trimmed = provider_text.trim();
        let full_text = if trimmed.is_empty() {
            segments
                .iter()
                .map(|segment| segment.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            trimmed.to_string()
        };

        Self {
            full_text,
            language_code,
            segments,
        }
    }
}
