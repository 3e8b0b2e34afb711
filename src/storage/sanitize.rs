/// Name used when nothing usable is left of the uploaded file name.
pub const FALLBACK_FILENAME: &str = "file.bin";

/// Reduces a user-supplied file name to something safe to place inside a
/// transfer directory.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !matches!(c, ':' | '\0') && !c.is_control())
        .collect();

    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return FALLBACK_FILENAME.to_string();
    }
    cleaned.to_string()
}

/// On-disk name for the file at `index`; the prefix keeps duplicate
/// uploads from colliding.
pub fn stored_filename(index: usize, name: &str) -> String {
    format!("{:02}_{}", index, sanitize_filename(name))
}
