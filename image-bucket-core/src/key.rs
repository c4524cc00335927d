//! Destination object keys.
//!
//! Keys are held as a list of non-empty segments and only rendered to a
//! `/`-joined string when a key is handed to the store, so doubled
//! separators cannot appear no matter how prefixes and links were glued
//! together upstream.

use std::fmt;

use chrono::Datelike;

use crate::classify::is_month_token;

const SEPARATOR: char = '/';

/// A destination location in the bucket, as path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Splits on `/` and drops empty and `.` segments.
    pub fn parse(raw: &str) -> Self {
        let mut path = Self::default();
        path.push(raw);
        path
    }

    /// Appends every segment of `raw`, skipping empty and `.` segments.
    pub fn push(&mut self, raw: &str) {
        self.segments.extend(
            raw.split(SEPARATOR)
                .filter(|segment| !segment.is_empty() && *segment != ".")
                .map(str::to_owned),
        );
    }

    pub fn join(&self, raw: &str) -> Self {
        let mut child = self.clone();
        child.push(raw);
        child
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Rendered as an object key: no leading separator, no trailing one.
    pub fn to_key(&self) -> String {
        self.segments.join("/")
    }

    /// Rendered as a folder prefix, ending in exactly one separator.
    pub fn to_prefix(&self) -> String {
        if self.segments.is_empty() {
            return String::new();
        }
        let mut prefix = self.to_key();
        prefix.push(SEPARATOR);
        prefix
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

/// Collapses any run of separators into one and strips leading ones.
///
/// `collapse_separators("x//y///z.jpg") == "x/y/z.jpg"`. A trailing
/// separator is kept (as a single one) so folder prefixes survive.
pub fn collapse_separators(raw: &str) -> String {
    let path = KeyPath::parse(raw);
    if raw.ends_with(SEPARATOR) {
        path.to_prefix()
    } else {
        path.to_key()
    }
}

/// Rewrites a trailing month folder (`05`) to `<year>-05-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRewrite {
    year: i32,
}

impl MonthRewrite {
    /// Uses the current calendar year from the local clock.
    pub fn current() -> Self {
        Self::for_year(chrono::Local::now().year())
    }

    pub fn for_year(year: i32) -> Self {
        Self { year }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Applies the rewrite to the last segment of `path`, if it is a month.
    pub fn apply(&self, path: &KeyPath) -> KeyPath {
        match path.last() {
            Some(last) if is_month_token(last) => {
                let mut rewritten = path.clone();
                if let Some(slot) = rewritten.segments.last_mut() {
                    *slot = format!("{:04}-{}-01", self.year, last);
                }
                rewritten
            }
            _ => path.clone(),
        }
    }

    /// String form of [`MonthRewrite::apply`]; separators are collapsed and a
    /// trailing separator on the input is preserved.
    pub fn transform(&self, raw: &str) -> String {
        let rewritten = self.apply(&KeyPath::parse(raw));
        if raw.ends_with(SEPARATOR) {
            rewritten.to_prefix()
        } else {
            rewritten.to_key()
        }
    }
}
