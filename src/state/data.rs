/// Shared data structures for gallery content
///
/// These structs represent the data model supplied by the page sections
/// (or a content file) and consumed by the layout engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::ContentError;
use crate::layout::LayoutMode;

/// Caller-supplied identifier of a media item (string or integer)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum MediaId {
    Number(i64),
    Text(String),
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaId::Number(n) => write!(f, "{}", n),
            MediaId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MediaId {
    fn from(n: i64) -> Self {
        MediaId::Number(n)
    }
}

impl From<&str> for MediaId {
    fn from(s: &str) -> Self {
        MediaId::Text(s.to_string())
    }
}

/// Width / height ratio of a cell
///
/// Always positive and finite. Accepts a bare number (`1.5`) or a CSS
/// ratio string (`"4 / 3"`, `"16:9"`, `"1.25"`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, PartialOrd)]
#[serde(try_from = "RatioRepr", into = "f32")]
pub struct AspectRatio(f32);

impl AspectRatio {
    /// 4:3, the fallback for cells without an explicit ratio
    pub const LANDSCAPE: AspectRatio = AspectRatio(4.0 / 3.0);
    /// 1:1
    pub const SQUARE: AspectRatio = AspectRatio(1.0);

    pub fn new(ratio: f32) -> Result<Self, ContentError> {
        if ratio.is_finite() && ratio > 0.0 {
            Ok(Self(ratio))
        } else {
            Err(ContentError::InvalidAspectRatio(ratio.to_string()))
        }
    }

    /// Parse a CSS-style ratio string
    pub fn parse(text: &str) -> Result<Self, ContentError> {
        let invalid = || ContentError::InvalidAspectRatio(text.to_string());
        let trimmed = text.trim();

        let ratio = match trimmed.split_once(['/', ':']) {
            Some((w, h)) => {
                let w: f32 = w.trim().parse().map_err(|_| invalid())?;
                let h: f32 = h.trim().parse().map_err(|_| invalid())?;
                w / h
            }
            None => trimmed.parse().map_err(|_| invalid())?,
        };

        Self::new(ratio).map_err(|_| invalid())
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Height of a box of the given width at this ratio
    pub fn height_for(self, width: f32) -> f32 {
        width / self.0
    }
}

impl From<AspectRatio> for f32 {
    fn from(ratio: AspectRatio) -> Self {
        ratio.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RatioRepr {
    Number(f32),
    Text(String),
}

impl TryFrom<RatioRepr> for AspectRatio {
    type Error = ContentError;

    fn try_from(repr: RatioRepr) -> Result<Self, Self::Error> {
        match repr {
            RatioRepr::Number(n) => AspectRatio::new(n),
            RatioRepr::Text(s) => AspectRatio::parse(&s),
        }
    }
}

/// Represents a single image to be shown in a gallery
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MediaItem {
    /// Stable identifier; missing or duplicated ids get a positional key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MediaId>,
    /// Path or http(s) URL of the asset; an empty source skips the cell
    #[serde(rename = "src", default)]
    pub source: String,
    /// Human-readable description
    #[serde(default)]
    pub alt: String,
    /// Overrides the slot's default ratio for this cell only
    #[serde(rename = "aspectRatio", default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
}

impl MediaItem {
    pub fn new(id: impl Into<MediaId>, source: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            source: source.into(),
            alt: alt.into(),
            aspect_ratio: None,
        }
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }
}

/// A content file: the layout mode plus the ordered media list
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GalleryContent {
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default)]
    pub items: Vec<MediaItem>,
}

impl GalleryContent {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read a content file from disk
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
