use std::fmt;

use super::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Subtitle,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Subtitle => "srt",
        }
    }

    /// A missing selector means plain text.
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        let Some(raw) = value else {
            return Ok(Self::Text);
        };

        match raw.trim().to_lowercase().as_str() {
            "" | "text" => Ok(Self::Text),
            "srt" => Ok(Self::Subtitle),
            other => Err(ValidationError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
