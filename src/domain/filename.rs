use unicode_normalization::UnicodeNormalization;

pub const MAX_FILENAME_BYTES: usize = 200;
pub const UNNAMED_PLACEHOLDER: &str = "unnamed";

const HAZARD_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turns an untrusted client filename into a bounded name that is safe to use
/// as a single path component.
///
/// The result is never empty, never contains separators or control
/// characters, and is a fixed point: sanitizing it again returns it unchanged.
/// Non-Latin scripts pass through untouched as long as the name fits in
/// [`MAX_FILENAME_BYTES`].
pub fn sanitize_filename(raw: &str) -> String {
    let cleaned: String = raw
        .nfc()
        .filter(|c| !c.is_control())
        .map(|c| if HAZARD_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = trim_name(&cleaned);
    if trimmed.is_empty() {
        return UNNAMED_PLACEHOLDER.to_string();
    }

    if trimmed.len() <= MAX_FILENAME_BYTES {
        return trimmed.to_string();
    }

    truncate_preserving_extension(trimmed)
}

fn trim_name(name: &str) -> &str {
    name.trim_matches(|c: char| c.is_whitespace() || c == '.')
}

fn truncate_preserving_extension(name: &str) -> String {
    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot < MAX_FILENAME_BYTES => name.split_at(dot),
        _ => (name, ""),
    };

    let mut cut = MAX_FILENAME_BYTES - extension.len();
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }

    let stem = stem[..cut].trim_end_matches(|c: char| c.is_whitespace() || c == '.');
    // The placeholder has to fit the same room, which may be a single byte.
    let stem = if stem.is_empty() {
        &UNNAMED_PLACEHOLDER[..UNNAMED_PLACEHOLDER.len().min(MAX_FILENAME_BYTES - extension.len())]
    } else {
        stem
    };

    format!("{stem}{extension}")
}
