/// Media loading support
///
/// This module handles:
/// - Tracking which deferred loaders became visible (visibility.rs)
/// - Resolving responsive width descriptors (sizes.rs)
/// - Fetching, downsizing and re-encoding assets (fetch.rs)

pub mod fetch;
pub mod sizes;
pub mod visibility;

pub use fetch::{fetch, AssetSource, FetchOptions};
pub use sizes::SizesHint;
pub use visibility::{intersection_ratio, VisibilityTracker};
