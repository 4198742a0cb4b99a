use std::fmt;

pub const DEFAULT_LANGUAGE_CODE: &str = "en";

const AUTO_SENTINEL: &str = "auto";

/// Language requested by the client. `Auto` asks the provider to detect it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LanguageHint {
    #[default]
    Auto,
    Code(String),
}

impl LanguageHint {
    pub fn parse(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::Auto;
        };

        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() || normalized == AUTO_SENTINEL {
            Self::Auto
        } else {
            Self::Code(normalized)
        }
    }

    /// The value handed to a provider: `None` lets it detect the language.
    pub fn as_provider_hint(&self) -> Option<&str> {
        match self {
            Self::Auto => None,
            Self::Code(code) => Some(code.as_str()),
        }
    }
}

impl fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str(AUTO_SENTINEL),
            Self::Code(code) => f.write_str(code),
        }
    }
}

/// Picks the language reported for a transcript.
///
/// A language the provider detected wins; otherwise the explicit hint is used,
/// and only when both are silent does the result fall back to
/// [`DEFAULT_LANGUAGE_CODE`].
pub fn resolve_language_code(detected: Option<&str>, hint: &LanguageHint) -> String {
    detected
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .or_else(|| hint.as_provider_hint())
        .unwrap_or(DEFAULT_LANGUAGE_CODE)
        .to_string()
}
