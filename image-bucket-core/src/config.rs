use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Image extensions mirrored when the configuration does not name any.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Immutable settings for one traversal of the source archive.
///
/// Built once by the caller (CLI or test) and handed to the walker; nothing
/// downstream reads the process environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory index page the traversal starts from.
    pub root_url: String,
    /// Key prefix in the bucket that mirrors `root_url`.
    pub destination_prefix: String,
    /// Skip descending into two-digit month folders.
    #[serde(default)]
    pub flatten_months: bool,
    #[serde(default)]
    pub image_extensions: ImageExtensions,
}

impl SyncConfig {
    pub fn new(root_url: impl Into<String>, destination_prefix: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            destination_prefix: destination_prefix.into(),
            flatten_months: false,
            image_extensions: ImageExtensions::default(),
        }
    }

    pub fn with_flatten_months(mut self, flatten_months: bool) -> Self {
        self.flatten_months = flatten_months;
        self
    }

    pub fn with_image_extensions(mut self, extensions: ImageExtensions) -> Self {
        self.image_extensions = extensions;
        self
    }

    pub fn trace_loaded(&self) {
        info!(
            root_url = %self.root_url,
            destination_prefix = %self.destination_prefix,
            flatten_months = self.flatten_months,
            extensions = ?self.image_extensions.as_slice(),
            "Loaded SyncConfig"
        );
        debug!(?self, "SyncConfig loaded (full debug)");
    }
}

/// Lower-cased allow-list of file extensions treated as images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ImageExtensions(Vec<String>);

impl ImageExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalised: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
            if !ext.is_empty() && !normalised.contains(&ext) {
                normalised.push(ext);
            }
        }
        Self(normalised)
    }

    /// Case-insensitive membership test; `ext` is given without the dot.
    pub fn contains(&self, ext: &str) -> bool {
        self.0.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for ImageExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXTENSIONS)
    }
}

impl From<Vec<String>> for ImageExtensions {
    fn from(extensions: Vec<String>) -> Self {
        if extensions.is_empty() {
            return Self::default();
        }
        Self::new(extensions)
    }
}

impl From<ImageExtensions> for Vec<String> {
    fn from(extensions: ImageExtensions) -> Self {
        extensions.0
    }
}
