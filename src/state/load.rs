/// Deferred media loader
///
/// One `DeferredLoader` exists per rendered cell. It decides when the asset
/// may be fetched (immediately for priority items, otherwise on the first
/// visibility observation at or above [`VISIBILITY_THRESHOLD`]) and tracks
/// the fetch lifecycle `Idle -> Loading -> Loaded | Errored`.

use iced::widget::image::Handle;
use log::{debug, warn};
use std::fmt;

use crate::error::FetchError;

/// Fraction of a cell's area that must intersect the viewport to trigger a fetch
pub const VISIBILITY_THRESHOLD: f32 = 0.10;

/// Default encode quality passed to the optimizer
pub const DEFAULT_QUALITY: u8 = 88;

/// Default responsive width descriptor
pub const DEFAULT_SIZES: &str = "(max-width: 768px) 100vw, (max-width: 1200px) 50vw, 33vw";

/// Duration of the hover overlay fade, in seconds
const OVERLAY_FADE_SECS: f32 = 0.5;

/// Identity of one loader instance
///
/// A new id is allocated every time a loader is (re)created, so results
/// addressed to a destroyed instance can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fetch lifecycle of one loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Not yet eligible to fetch
    #[default]
    Idle,
    /// Fetch issued, not resolved
    Loading,
    /// Fetch succeeded
    Loaded,
    /// Fetch failed; terminal
    Errored,
}

/// What the caller asks a loader to show
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub source: String,
    pub alt: String,
    /// Skip visibility deferral and fetch at mount
    pub priority: bool,
    /// Encode quality for the optimizer (1..=100)
    pub quality: u8,
    /// Responsive width descriptor, passed through to the optimizer
    pub sizes: String,
}

impl LoadRequest {
    pub fn new(source: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alt: alt.into(),
            priority: false,
            quality: DEFAULT_QUALITY,
            sizes: DEFAULT_SIZES.to_string(),
        }
    }

    pub fn priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = sizes.into();
        self
    }
}

/// A fetch the loader wants issued
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub instance: InstanceId,
    pub source: String,
    pub quality: u8,
    pub sizes: String,
}

/// A decoded, optimized asset ready for display
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

/// Which visual layers a cell shows for the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers {
    pub placeholder: bool,
    pub content: bool,
    pub overlay: bool,
}

/// What `mount` decided
#[derive(Debug, Clone, PartialEq)]
pub enum Mount {
    /// Priority item: fetch now
    Fetch(FetchRequest),
    /// Deferred item: register a visibility watcher
    Watch,
}

/// Per-cell loader state machine
#[derive(Debug, Clone)]
pub struct DeferredLoader {
    instance: InstanceId,
    request: LoadRequest,
    state: LoadState,
    asset: Option<LoadedAsset>,
    error: Option<FetchError>,
    hovered: bool,
    overlay_opacity: f32,
}

impl DeferredLoader {
    pub fn new(instance: InstanceId, mut request: LoadRequest) -> Self {
        if request.alt.trim().is_empty() {
            let fallback = request
                .source
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or_default()
                .to_string();
            warn!("⚠️  Missing alt text for {}, using {:?}", request.source, fallback);
            request.alt = fallback;
        }
        request.quality = request.quality.clamp(1, 100);

        Self {
            instance,
            request,
            state: LoadState::Idle,
            asset: None,
            error: None,
            hovered: false,
            overlay_opacity: 0.0,
        }
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn request(&self) -> &LoadRequest {
        &self.request
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn asset(&self) -> Option<&LoadedAsset> {
        self.asset.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.overlay_opacity
    }

    /// Called once when the cell is created
    pub fn mount(&mut self) -> Mount {
        if self.request.priority {
            match self.begin() {
                Some(fetch) => Mount::Fetch(fetch),
                None => Mount::Watch,
            }
        } else {
            Mount::Watch
        }
    }

    /// Record a visibility observation; fires at most once
    pub fn observe(&mut self, ratio: f32) -> Option<FetchRequest> {
        if ratio >= VISIBILITY_THRESHOLD {
            self.begin()
        } else {
            None
        }
    }

    fn begin(&mut self) -> Option<FetchRequest> {
        if self.state != LoadState::Idle {
            return None;
        }

        self.state = LoadState::Loading;
        debug!("Loader {} fetching {}", self.instance, self.request.source);

        Some(FetchRequest {
            instance: self.instance,
            source: self.request.source.clone(),
            quality: self.request.quality,
            sizes: self.request.sizes.clone(),
        })
    }

    /// Apply the outcome of the fetch issued by this loader
    pub fn resolve(&mut self, result: Result<LoadedAsset, FetchError>) {
        if self.state != LoadState::Loading {
            debug!(
                "Loader {} ignoring fetch result in state {:?}",
                self.instance, self.state
            );
            return;
        }

        match result {
            Ok(asset) => {
                debug!(
                    "Loader {} loaded {} ({}x{})",
                    self.instance, self.request.source, asset.width, asset.height
                );
                self.asset = Some(asset);
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                warn!("⚠️  Failed to load {}: {}", self.request.source, err);
                self.error = Some(err);
                self.state = LoadState::Errored;
            }
        }
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Advance the overlay fade; returns true while still animating
    pub fn animate(&mut self, dt: f32) -> bool {
        let target = self.overlay_target();
        let step = dt / OVERLAY_FADE_SECS;

        if self.overlay_opacity < target {
            self.overlay_opacity = (self.overlay_opacity + step).min(target);
        } else if self.overlay_opacity > target {
            self.overlay_opacity = (self.overlay_opacity - step).max(target);
        }

        self.is_animating()
    }

    /// Placeholder pulsing or overlay fading
    pub fn is_animating(&self) -> bool {
        self.layers().placeholder || self.is_fading()
    }

    /// Overlay still moving toward its hover target
    pub fn is_fading(&self) -> bool {
        self.overlay_opacity != self.overlay_target()
    }

    fn overlay_target(&self) -> f32 {
        if self.hovered && self.state == LoadState::Loaded {
            1.0
        } else {
            0.0
        }
    }

    pub fn layers(&self) -> Layers {
        match self.state {
            LoadState::Idle | LoadState::Loading => Layers {
                placeholder: true,
                content: false,
                overlay: false,
            },
            LoadState::Loaded => Layers {
                placeholder: false,
                content: true,
                overlay: true,
            },
            LoadState::Errored => Layers {
                placeholder: false,
                content: false,
                overlay: false,
            },
        }
    }
}
