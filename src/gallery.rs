//! Gallery controller
//!
//! Owns the planned cells, one [`DeferredLoader`] per cell, and the shared
//! [`VisibilityTracker`]. The pure methods (`mount`, `set_viewport`,
//! `resolve`, ...) return the fetches to issue; [`Gallery::update`] wraps
//! them into iced tasks.

use iced::widget::scrollable;
use iced::{Element, Size, Subscription, Task};
use log::{debug, info};
use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use crate::error::FetchError;
use crate::layout::{self, CellKey, GridPlacement, LayoutMode, PlannedCell, Rect};
use crate::media::{fetch, FetchOptions, VisibilityTracker};
use crate::state::config::GalleryConfig;
use crate::state::data::MediaItem;
use crate::state::load::{DeferredLoader, FetchRequest, InstanceId, LoadRequest, LoadedAsset, Mount};
use crate::ui::{self, GalleryStyle};

/// Animation frame interval while a placeholder or overlay is animating
const FRAME: Duration = Duration::from_millis(33);

/// Placeholder pulse period, in seconds
const PULSE_PERIOD: f32 = 2.0;

#[derive(Debug, Clone)]
pub enum GalleryMessage {
    /// Size of the scroll area changed
    Resized(Size),
    /// The scroll area moved
    Scrolled(scrollable::Viewport),
    /// A fetch finished
    Fetched {
        instance: InstanceId,
        result: Result<LoadedAsset, FetchError>,
    },
    Hovered {
        instance: InstanceId,
        hovered: bool,
    },
    Tick(Instant),
}

/// One rendered cell
#[derive(Debug, Clone)]
pub struct GalleryCell {
    pub planned: PlannedCell,
    pub loader: DeferredLoader,
    /// Placement in gallery coordinates
    pub rect: Rect,
}

impl GalleryCell {
    pub fn key(&self) -> &CellKey {
        &self.planned.key
    }
}

pub struct Gallery {
    items: Vec<MediaItem>,
    mode: LayoutMode,
    config: GalleryConfig,
    style: GalleryStyle,
    cells: Vec<GalleryCell>,
    placement: GridPlacement,
    tracker: VisibilityTracker,
    next_instance: u64,
    mounted: bool,
    container_width: f32,
    /// Visible region in gallery coordinates
    viewport: Option<Rect>,
    scroll_offset: (f32, f32),
    pulse_phase: f32,
    last_tick: Option<Instant>,
}

impl Gallery {
    pub fn new(items: Vec<MediaItem>, mode: LayoutMode, config: GalleryConfig) -> Self {
        let mut gallery = Self {
            items,
            mode,
            config,
            style: GalleryStyle::default(),
            cells: Vec::new(),
            placement: GridPlacement::default(),
            tracker: VisibilityTracker::new(),
            next_instance: 0,
            mounted: false,
            container_width: 0.0,
            viewport: None,
            scroll_offset: (0.0, 0.0),
            pulse_phase: 0.0,
            last_tick: None,
        };
        gallery.rebuild();
        gallery
    }

    pub fn with_style(mut self, style: GalleryStyle) -> Self {
        self.style = style;
        self
    }

    pub fn cells(&self) -> &[GalleryCell] {
        &self.cells
    }

    pub fn cell(&self, key: &CellKey) -> Option<&GalleryCell> {
        self.cells.iter().find(|cell| cell.key() == key)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn style(&self) -> &GalleryStyle {
        &self.style
    }

    pub fn tracker(&self) -> &VisibilityTracker {
        &self.tracker
    }

    pub fn columns(&self) -> usize {
        self.placement.columns
    }

    pub fn content_width(&self) -> f32 {
        self.placement.content_width
    }

    pub fn content_height(&self) -> f32 {
        self.placement.content_height
    }

    /// Mount every loader: priority loaders fetch, the rest start watching
    pub fn mount(&mut self) -> Vec<FetchRequest> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        self.mount_cells()
    }

    /// Replace the item list; every loader is recreated
    pub fn set_items(&mut self, items: Vec<MediaItem>) -> Vec<FetchRequest> {
        self.items = items;
        self.rebuild()
    }

    /// Switch layout mode; slots and loaders are derived from scratch
    pub fn set_layout_mode(&mut self, mode: LayoutMode) -> Vec<FetchRequest> {
        if mode == self.mode {
            return Vec::new();
        }
        info!("🧩 Switching gallery layout to {:?}", mode);
        self.mode = mode;
        self.rebuild()
    }

    /// Update the visible region and the container width
    pub fn set_viewport(&mut self, viewport: Rect, container_width: f32) -> Vec<FetchRequest> {
        if container_width != self.container_width {
            self.container_width = container_width;
            self.relayout();
        }
        self.viewport = Some(viewport);

        if self.mounted {
            self.evaluate()
        } else {
            Vec::new()
        }
    }

    /// Route a fetch result to its loader; returns false for unmounted instances
    pub fn resolve(&mut self, instance: InstanceId, result: Result<LoadedAsset, FetchError>) -> bool {
        match self.loader_mut(instance) {
            Some(loader) => {
                loader.resolve(result);
                true
            }
            None => {
                debug!("Dropping fetch result for unmounted loader {}", instance);
                false
            }
        }
    }

    pub fn hover(&mut self, instance: InstanceId, hovered: bool) {
        if let Some(loader) = self.loader_mut(instance) {
            loader.set_hovered(hovered);
        }
    }

    /// Advance placeholder pulse and overlay fades
    pub fn tick(&mut self, now: Instant) {
        let dt = self
            .last_tick
            .map(|last| now.saturating_duration_since(last).as_secs_f32().min(0.1))
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        self.pulse_phase = (self.pulse_phase + dt / PULSE_PERIOD).fract();
        for cell in &mut self.cells {
            cell.loader.animate(dt);
        }
    }

    /// Overlay fading anywhere, or a placeholder pulsing on screen
    pub fn is_animating(&self) -> bool {
        self.cells.iter().any(|cell| {
            cell.loader.is_fading() || (cell.loader.layers().placeholder && self.is_on_screen(&cell.rect))
        })
    }

    /// Placeholder opacity, pulsing between 0.5 and 1.0
    pub fn pulse_opacity(&self) -> f32 {
        0.75 + 0.25 * (self.pulse_phase * TAU).cos()
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            viewport_width: self.viewport.map(|v| v.width).unwrap_or(0.0),
            cache_dir: self.config.cache_dir(),
        }
    }

    pub fn update(&mut self, message: GalleryMessage) -> Task<GalleryMessage> {
        let requests = match message {
            GalleryMessage::Resized(size) => self.viewport_changed(size),
            GalleryMessage::Scrolled(viewport) => {
                let offset = viewport.absolute_offset();
                self.scroll_offset = (offset.x, offset.y);
                self.viewport_changed(viewport.bounds().size())
            }
            GalleryMessage::Fetched { instance, result } => {
                self.resolve(instance, result);
                Vec::new()
            }
            GalleryMessage::Hovered { instance, hovered } => {
                self.hover(instance, hovered);
                Vec::new()
            }
            GalleryMessage::Tick(now) => {
                self.tick(now);
                Vec::new()
            }
        };

        self.spawn(requests)
    }

    pub fn view(&self) -> Element<'_, GalleryMessage> {
        ui::gallery::view(self)
    }

    pub fn subscription(&self) -> Subscription<GalleryMessage> {
        if self.is_animating() {
            iced::time::every(FRAME).map(GalleryMessage::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Turn fetch requests into tasks, one per request
    pub fn spawn(&self, requests: Vec<FetchRequest>) -> Task<GalleryMessage> {
        if requests.is_empty() {
            return Task::none();
        }

        let options = self.fetch_options();
        Task::batch(requests.into_iter().map(|request| {
            let instance = request.instance;
            Task::perform(fetch(request, options.clone()), move |result| {
                GalleryMessage::Fetched { instance, result }
            })
        }))
    }

    fn viewport_changed(&mut self, size: Size) -> Vec<FetchRequest> {
        let padding = self.config.padding;
        let viewport = Rect::new(
            self.scroll_offset.0 - padding,
            self.scroll_offset.1 - padding,
            size.width,
            size.height,
        );
        let container_width = (size.width - 2.0 * padding).max(0.0);

        let mut requests = self.set_viewport(viewport, container_width);
        requests.extend(self.mount());
        requests
    }

    fn rebuild(&mut self) -> Vec<FetchRequest> {
        for cell in &self.cells {
            self.tracker.unregister(cell.loader.instance());
        }

        let planned = layout::plan(&self.items, self.mode);
        self.cells = planned
            .into_iter()
            .map(|planned| {
                self.next_instance += 1;
                let request = LoadRequest::new(planned.item.source.clone(), planned.item.alt.clone())
                    .priority(planned.priority)
                    .quality(self.config.quality)
                    .sizes(self.config.sizes.clone());

                GalleryCell {
                    loader: DeferredLoader::new(InstanceId(self.next_instance), request),
                    planned,
                    rect: Rect::default(),
                }
            })
            .collect();

        debug!("Planned {} gallery cells ({:?})", self.cells.len(), self.mode);
        self.relayout();

        if self.mounted {
            self.mount_cells()
        } else {
            Vec::new()
        }
    }

    fn relayout(&mut self) {
        let planned: Vec<PlannedCell> = self.cells.iter().map(|cell| cell.planned.clone()).collect();
        self.placement = layout::place(&planned, self.mode, self.container_width, &self.config);

        for (cell, rect) in self.cells.iter_mut().zip(&self.placement.rects) {
            cell.rect = *rect;
        }
    }

    fn mount_cells(&mut self) -> Vec<FetchRequest> {
        let mut requests = Vec::new();
        for cell in &mut self.cells {
            match cell.loader.mount() {
                Mount::Fetch(request) => requests.push(request),
                Mount::Watch => {
                    self.tracker.register(cell.loader.instance());
                }
            }
        }

        requests.extend(self.evaluate());
        requests
    }

    fn evaluate(&mut self) -> Vec<FetchRequest> {
        let Some(viewport) = self.viewport else {
            return Vec::new();
        };

        let fired = self.tracker.observe(
            viewport,
            self.cells.iter().map(|cell| (cell.loader.instance(), cell.rect)),
        );

        fired
            .into_iter()
            .filter_map(|(instance, ratio)| self.loader_mut(instance)?.observe(ratio))
            .collect()
    }

    fn is_on_screen(&self, rect: &Rect) -> bool {
        self.viewport
            .and_then(|viewport| viewport.intersection(rect))
            .is_some_and(|overlap| overlap.area() > 0.0)
    }

    fn loader_mut(&mut self, instance: InstanceId) -> Option<&mut DeferredLoader> {
        self.cells
            .iter_mut()
            .map(|cell| &mut cell.loader)
            .find(|loader| loader.instance() == instance)
    }
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("mode", &self.mode)
            .field("cells", &self.cells.len())
            .field("mounted", &self.mounted)
            .finish()
    }
}
