/// iced views
///
/// - `lazy_image.rs` - one deferred image cell (usable on its own)
/// - `gallery.rs` - the positioned grid inside a scroll area
/// - `style.rs` - pass-through visual tokens

pub mod gallery;
pub mod lazy_image;
pub mod style;

pub use style::GalleryStyle;
