//! Decides what a hyperlink found on a directory index page points at.

use crate::config::ImageExtensions;

/// Classification of a single `href` from an index page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `../` and friends; never traversed.
    ParentReference,
    /// Anything ending in `/`.
    FolderReference,
    /// A file whose extension is on the allow-list.
    ImageReference,
    Ignored,
}

const PARENT_TOKENS: &[&str] = &["..", "../", ".", "./"];

pub fn classify(link: &str, extensions: &ImageExtensions) -> LinkKind {
    if PARENT_TOKENS.contains(&link) {
        return LinkKind::ParentReference;
    }
    if link.ends_with('/') {
        return LinkKind::FolderReference;
    }
    match extension_of(link) {
        Some(ext) if extensions.contains(ext) => LinkKind::ImageReference,
        _ => LinkKind::Ignored,
    }
}

/// Extension of the last path component, without the dot.
fn extension_of(link: &str) -> Option<&str> {
    let name = link.rsplit('/').next().unwrap_or(link);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// True for `01`..`12`, with or without a trailing `/`.
///
/// Used both to skip month folders in flatten mode and to decide whether a
/// destination prefix gets the date rewrite.
pub fn is_month_token(segment: &str) -> bool {
    let token = segment.strip_suffix('/').unwrap_or(segment);
    let bytes = token.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    matches!(token.parse::<u8>(), Ok(1..=12))
}
