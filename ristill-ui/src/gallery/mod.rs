//! Gallery container - the masonry listing.
//!
//! Composes layout policy, balancer, column virtualizers and the scroll
//! cache:
//!
//! 1. `mount` resolves the layout, assigns images to columns and tries to
//!    restore each column from the cache (item count must match).
//! 2. Restored columns jump to their saved index right away; the page offset
//!    follows `RESTORE_FRAME_DELAY` animation frames later.
//! 3. Scrolling re-syncs the columns and restarts each column's save timer;
//!    `tick` saves the columns whose timer ran out.
//! 4. `unmount` and `persist_all` (page hidden) save immediately.
//!
//! `scroll_to_top` moves everything to the top and clears the cache.

pub mod column;
pub mod measure;
pub mod registry;

use std::ops::Range;
use std::rc::Rc;

use chrono::TimeDelta;
use ristill_api::{ColumnId, GalleryEvent, RecordId, Route, ScrollAnchor};
use ristill_kernel::{
    ClearScope, Clock, ImageService, MaterialStore, OptimizerEndpoint, ScrollCache,
};
use serde::Serialize;
use tessella::{
    BreakpointName, LayoutPolicy, PageScroll, Rect, ResolvedLayout, ScrollAction, ScrollBehavior,
    Size, assign,
};
use tokio::sync::broadcast;

use crate::config::GalleryConfig;
use crate::constants::{RESTORE_FRAME_DELAY, TOP_BUTTON_THRESHOLD};
use column::{MountedColumn, announcement};
use measure::{IntrinsicMeasure, Measurer};
use registry::VirtualizerRegistry;

/// Tunables that are not part of the layout policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalleryOptions {
    pub overscan: usize,
    pub debounce: TimeDelta,
    pub image_quality: u8,
    pub placeholder_blur: u8,
}

/// Everything a gallery needs from its surroundings. Cheap to clone.
#[derive(Clone)]
pub struct GalleryContext {
    pub store: Rc<MaterialStore>,
    pub policy: LayoutPolicy,
    pub options: GalleryOptions,
    pub measurer: Rc<dyn Measurer>,
    pub images: Rc<dyn ImageService>,
    pub clock: Rc<dyn Clock>,
    pub events: broadcast::Sender<GalleryEvent>,
}

impl GalleryContext {
    pub fn from_config(
        store: Rc<MaterialStore>,
        config: &GalleryConfig,
        clock: Rc<dyn Clock>,
        events: broadcast::Sender<GalleryEvent>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            policy: config.layout_policy()?,
            options: GalleryOptions {
                overscan: config.overscan,
                debounce: config.debounce(),
                image_quality: config.image_quality,
                placeholder_blur: config.placeholder_blur,
            },
            measurer: Rc::new(IntrinsicMeasure {
                caption_height: config.caption_height,
            }),
            images: Rc::new(OptimizerEndpoint::new(config.optimizer_url.clone())),
            clock,
            events,
        })
    }
}

/// Page offset waiting for the virtualizers to settle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingRestore {
    offset: f32,
    frames_left: u8,
}

pub struct Gallery {
    ctx: GalleryContext,
    layout: ResolvedLayout,
    viewport: Size,
    page: PageScroll,
    columns: Vec<MountedColumn>,
    registry: VirtualizerRegistry,
    restore: Option<PendingRestore>,
}

impl Gallery {
    /// Mount the gallery and restore saved scroll state if it still fits.
    pub fn mount(ctx: GalleryContext, viewport: Size, cache: &ScrollCache) -> Self {
        let layout = ctx.policy.resolve(viewport.width);
        let mut page = PageScroll::new();
        page.set_viewport_height(viewport.height);

        let mut gallery = Self {
            ctx,
            layout,
            viewport,
            page,
            columns: Vec::new(),
            registry: VirtualizerRegistry::new(),
            restore: None,
        };
        gallery.build_columns();

        match gallery.restore_columns(cache) {
            Some(offset) => {
                tracing::debug!(offset, "restoring page offset after column reposition");
                gallery.restore = Some(PendingRestore {
                    offset,
                    frames_left: RESTORE_FRAME_DELAY,
                });
            }
            None => gallery.sync_all(),
        }
        gallery
    }

    pub fn layout(&self) -> &ResolvedLayout {
        &self.layout
    }

    pub fn columns(&self) -> &[MountedColumn] {
        &self.columns
    }

    pub fn registry(&self) -> &VirtualizerRegistry {
        &self.registry
    }

    pub fn page_offset(&self) -> f32 {
        self.page.offset()
    }

    pub fn is_restoring(&self) -> bool {
        self.restore.is_some()
    }

    /// Height of the tallest column.
    pub fn content_height(&self) -> f32 {
        self.columns
            .iter()
            .map(|c| c.view().view().total_height())
            .fold(0.0, f32::max)
    }

    // =====================================================================
    // Events from the page
    // =====================================================================

    /// Apply a scroll. A user scroll (`ScrollBy`) during restoration wins
    /// over the pending page offset.
    pub fn scroll(&mut self, action: ScrollAction) {
        if matches!(action, ScrollAction::ScrollBy(_)) && self.restore.take().is_some() {
            tracing::debug!("user scrolled during restoration; dropping pending page offset");
        }
        self.page.apply(action);
        self.sync_all();
        // Saves during restoration would record the half-restored position.
        if self.restore.is_none() {
            let now = self.ctx.clock.now();
            for column in &mut self.columns {
                column.debounce.poke(now);
            }
        }
    }

    /// Viewport resize. A different column geometry rebuilds every column;
    /// their old state is saved but not re-applied at the new geometry.
    pub fn resize(&mut self, viewport: Size, cache: &mut ScrollCache) {
        self.viewport = viewport;
        self.page.set_viewport_height(viewport.height);

        let layout = self.ctx.policy.resolve(viewport.width);
        if layout != self.layout {
            tracing::debug!(
                from = self.layout.column_count,
                to = layout.column_count,
                width = layout.column_width,
                "column geometry changed; rebuilding columns"
            );
            self.teardown_columns(cache);
            self.layout = layout;
            self.build_columns();
        }
        self.sync_all();
    }

    /// Timer tick: save columns whose scroll has settled.
    pub fn tick(&mut self, cache: &mut ScrollCache) {
        let now = self.ctx.clock.now();
        let offset = self.effective_offset();
        let mut saved = false;
        for column in &mut self.columns {
            if column.debounce.fire_if_due(now) {
                save_column(column, offset, cache, &self.ctx.events);
                saved = true;
            }
        }
        if saved {
            cache.save_page(offset);
        }
    }

    /// Animation frame. Returns `true` on the frame that restores the page
    /// offset.
    pub fn animation_frame(&mut self) -> bool {
        let Some(pending) = self.restore.as_mut() else {
            return false;
        };
        pending.frames_left = pending.frames_left.saturating_sub(1);
        if pending.frames_left > 0 {
            return false;
        }

        let offset = pending.offset;
        self.restore = None;
        self.page.set_content_height(self.content_height());
        self.page.scroll_to(offset, ScrollBehavior::Auto);
        self.sync_all();
        emit(
            &self.ctx.events,
            GalleryEvent::PageScrollRestored {
                offset: self.page.offset(),
            },
        );
        true
    }

    /// Page hidden: save every column now.
    pub fn persist_all(&mut self, cache: &mut ScrollCache) {
        let offset = self.effective_offset();
        for column in &mut self.columns {
            column.debounce.cancel();
            save_column(column, offset, cache, &self.ctx.events);
        }
        cache.save_page(offset);
    }

    /// Scroll every column and the page to the top and forget saved state.
    pub fn scroll_to_top(&mut self, cache: &mut ScrollCache) {
        for (_, handle) in self.registry.iter() {
            handle.scroll_to_index(0, ScrollBehavior::Smooth);
        }
        self.page.scroll_to(0.0, ScrollBehavior::Smooth);
        self.restore = None;
        for column in &mut self.columns {
            column.debounce.cancel();
        }
        cache.clear(&ClearScope::All);
        emit(&self.ctx.events, GalleryEvent::CacheCleared);
        self.sync_all();
    }

    /// Save and tear down. Pending save timers die with the columns.
    pub fn unmount(mut self, cache: &mut ScrollCache) {
        let offset = self.effective_offset();
        self.teardown_columns(cache);
        cache.save_page(offset);
    }

    // =====================================================================
    // Rendering
    // =====================================================================

    pub fn render(&self) -> GalleryFrame {
        let records = self.ctx.store.records();
        let set_size = records.len();
        let width = self.layout.column_width;
        let quality = self.ctx.options.image_quality;
        let blur = self.ctx.options.placeholder_blur;

        let columns = self
            .columns
            .iter()
            .map(|column| {
                let view = column.view().view();
                let layout = view.layout();
                let x = self.layout.column_x(column.slot);

                let items = layout
                    .placements
                    .iter()
                    .filter_map(|placement| {
                        let dataset_index = column.dataset_index(placement.index)?;
                        let record = records.get(dataset_index)?;
                        let height = record.scaled_height(width).round() as u32;
                        Some(RenderedItem {
                            id: record.id.clone(),
                            label: record.display_name.clone(),
                            href: Route::Detail(record.id.clone()).path(),
                            rect: Rect::new(x, placement.top, width, placement.height),
                            pos_in_set: dataset_index + 1,
                            set_size,
                            src: self.ctx.images.variant_url(
                                &record.source_url,
                                width as u32,
                                height,
                                quality,
                            ),
                            placeholder: self.ctx.images.placeholder_url(&record.source_url, blur),
                        })
                    })
                    .collect();

                ColumnFrame {
                    id: column.id.clone(),
                    anchor: view.anchor(),
                    x,
                    top_spacer: layout.top_spacer,
                    bottom_spacer: layout.bottom_spacer,
                    total_height: layout.total_height,
                    announcement: announcement(column.slot, &view.visible_range(), column.len()),
                    items,
                }
            })
            .collect();

        GalleryFrame {
            breakpoint: self.layout.breakpoint,
            column_count: self.layout.column_count,
            column_width: width,
            content_width: self.layout.content_width(),
            page_offset: self.page.offset(),
            scroll_behavior: self.page.last_behavior(),
            show_top_button: self.page.offset() > TOP_BUTTON_THRESHOLD,
            content_height: self.content_height(),
            restoring: self.is_restoring(),
            columns,
        }
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// The offset to persist: the pending target while restoring.
    fn effective_offset(&self) -> f32 {
        self.restore
            .map(|pending| pending.offset)
            .unwrap_or_else(|| self.page.offset())
    }

    fn build_columns(&mut self) {
        let assignments = assign(
            self.ctx.store.records(),
            self.layout.column_count,
            self.layout.column_width,
            self.layout.row_gap,
        );
        self.columns = assignments
            .into_iter()
            .enumerate()
            .map(|(slot, assignment)| {
                MountedColumn::new(
                    assignment,
                    slot,
                    &self.layout,
                    self.ctx.options.overscan,
                    self.ctx.options.debounce,
                )
            })
            .collect();

        for column in &self.columns {
            self.registry.register(column.id.clone(), Some(column.handle()));
        }
        emit(
            &self.ctx.events,
            GalleryEvent::LayoutChanged {
                column_count: self.layout.column_count,
                column_width: self.layout.column_width,
            },
        );
    }

    fn teardown_columns(&mut self, cache: &mut ScrollCache) {
        let offset = self.effective_offset();
        for mut column in std::mem::take(&mut self.columns) {
            column.debounce.cancel();
            save_column(&column, offset, cache, &self.ctx.events);
            self.registry.register(column.id.clone(), None);
        }
    }

    /// Apply saved state to every column that has some. Returns the page
    /// offset to restore, if any.
    fn restore_columns(&mut self, cache: &ScrollCache) -> Option<f32> {
        let records = self.ctx.store.records();
        let width = self.layout.column_width;
        let height = self.viewport.height;
        let measurer = self.ctx.measurer.as_ref();
        let mut offset = None;

        for column in &mut self.columns {
            let changed = match cache.load(&column.id, column.len()) {
                Some(state) => {
                    let changed = column.restore(&state, height, records, width, measurer);
                    emit(
                        &self.ctx.events,
                        GalleryEvent::StateRestored {
                            column: column.id.clone(),
                            visible_start_index: state.visible_start_index,
                        },
                    );
                    offset.get_or_insert(state.viewport_offset);
                    changed
                }
                None => column.sync(0.0, height, records, width, measurer),
            };
            if let Some(range) = changed {
                announce(&self.ctx.events, column, &range);
            }
        }

        offset.or_else(|| cache.load_page())
    }

    fn sync_all(&mut self) {
        self.sync_columns();
        let before = self.page.offset();
        self.page.set_content_height(self.content_height());
        if self.page.offset() != before {
            self.sync_columns();
        }
    }

    fn sync_columns(&mut self) {
        let records = self.ctx.store.records();
        let width = self.layout.column_width;
        let offset = self.page.offset();
        let height = self.viewport.height;
        let measurer = self.ctx.measurer.as_ref();

        for column in &mut self.columns {
            if let Some(range) = column.sync(offset, height, records, width, measurer) {
                announce(&self.ctx.events, column, &range);
            }
        }
    }
}

fn save_column(
    column: &MountedColumn,
    offset: f32,
    cache: &mut ScrollCache,
    events: &broadcast::Sender<GalleryEvent>,
) {
    let state = column.state(offset);
    let visible_start_index = state.visible_start_index;
    cache.save(&column.id, &state);
    emit(
        events,
        GalleryEvent::StateSaved {
            column: column.id.clone(),
            visible_start_index,
        },
    );
}

fn announce(events: &broadcast::Sender<GalleryEvent>, column: &MountedColumn, range: &Range<usize>) {
    let (first, last) = if range.is_empty() {
        (0, 0)
    } else {
        (range.start + 1, range.end)
    };
    emit(
        events,
        GalleryEvent::VisibleRangeChanged {
            column: column.id.clone(),
            first,
            last,
            total: column.len(),
            anchor: column.anchor(),
        },
    );
}

/// Nobody listening is fine.
fn emit(events: &broadcast::Sender<GalleryEvent>, event: GalleryEvent) {
    let _ = events.send(event);
}

// =========================================================================
// Frame
// =========================================================================

/// What the listing shows for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryFrame {
    pub breakpoint: BreakpointName,
    pub column_count: usize,
    pub column_width: f32,
    /// Columns plus gaps, for centering the grid.
    pub content_width: f32,
    pub page_offset: f32,
    /// How the renderer should move to `page_offset`.
    pub scroll_behavior: ScrollBehavior,
    /// The floating scroll-to-top button is shown.
    pub show_top_button: bool,
    pub content_height: f32,
    pub restoring: bool,
    pub columns: Vec<ColumnFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFrame {
    pub id: ColumnId,
    /// First item in view within this column.
    pub anchor: ScrollAnchor,
    pub x: f32,
    pub top_spacer: f32,
    pub bottom_spacer: f32,
    pub total_height: f32,
    /// Screen-reader live region text.
    pub announcement: String,
    pub items: Vec<RenderedItem>,
}

/// One rendered tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedItem {
    pub id: RecordId,
    pub label: String,
    pub href: String,
    /// Page coordinates.
    pub rect: Rect,
    /// 1-based position in the dataset, whatever column the item is in.
    pub pos_in_set: usize,
    pub set_size: usize,
    pub src: String,
    pub placeholder: String,
}
