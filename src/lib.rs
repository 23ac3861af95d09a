//! # Folio Gallery
//!
//! Deferred image loading and responsive gallery layout for portfolio pages.
//!
//! - [`state::load::DeferredLoader`] decides when one image is fetched:
//!   immediately for priority items, otherwise the first time at least 10%
//!   of its cell is visible. It tracks `Idle -> Loading -> Loaded | Errored`.
//! - [`layout`] assigns each item a slot (`Simple` uniform grid or
//!   `Highlight` cyclic mosaic) and places the cells for a container width.
//! - [`gallery::Gallery`] ties both together, with one shared
//!   [`media::VisibilityTracker`] and one fetch task per loader.
//!
//! ```no_run
//! use folio_gallery::{Gallery, GalleryConfig, LayoutMode, MediaItem};
//!
//! let items = vec![
//!     MediaItem::new("hero", "content/work/hero.jpg", "Studio hero shot"),
//!     MediaItem::new("detail", "https://cdn.example.com/detail.png", "Packaging detail"),
//! ];
//! let mut gallery = Gallery::new(items, LayoutMode::Highlight, GalleryConfig::default());
//! let fetches = gallery.mount();
//! ```

pub mod error;
pub mod gallery;
pub mod layout;
pub mod media;
pub mod state;
pub mod ui;

pub use error::{ConfigError, ContentError, Error, FetchError};
pub use gallery::{Gallery, GalleryCell, GalleryMessage};
pub use layout::{CellKey, LayoutMode, Rect, SlotGeometry};
pub use state::config::GalleryConfig;
pub use state::data::{AspectRatio, GalleryContent, MediaId, MediaItem};
pub use state::load::{DeferredLoader, LoadRequest, LoadState, VISIBILITY_THRESHOLD};
pub use ui::GalleryStyle;
