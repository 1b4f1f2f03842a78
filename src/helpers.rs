const MAX_SLUG_LENGTH: usize = 80;

/// Turns a committee name into the key used for commission-specific keyword lookup.
///
/// Lowercases, collapses whitespace runs into single dashes, drops everything outside
/// `[a-z0-9-_.]`, squeezes dash runs and trims dangling separators. Falls back to
/// `"session"` when nothing survives.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.trim().to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
            continue;
        }
        if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '.') {
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push(ch);
    }
    slug.truncate(MAX_SLUG_LENGTH);
    let slug = slug.trim_matches(|c| matches!(c, '-' | '.' | '_'));
    if slug.is_empty() {
        "session".into()
    } else {
        slug.into()
    }
}
