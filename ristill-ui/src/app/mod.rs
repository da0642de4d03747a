//! Ristill app - routes navigation and page events to the gallery.
//!
//! The gallery only exists while the listing route is current. Leaving the
//! listing unmounts it (saving scroll state into the current history entry
//! and the session); coming back mounts a fresh one that restores from them.

mod message;

pub use message::GalleryMessage;

use std::rc::Rc;

use anyhow::Result;
use ristill_api::{GalleryEvent, ImageRecord, RecordId, Route};
use ristill_kernel::{
    Clock, DetailView, HistoryHandle, KeyValueStore, MaterialStore, NavKey, ScrollCache, related,
};
use tessella::Size;
use tokio::sync::broadcast;

use crate::config::GalleryConfig;
use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::gallery::{Gallery, GalleryContext, GalleryFrame};

/// What the current route shows.
#[derive(Debug)]
pub enum View<'a> {
    Listing(GalleryFrame),
    /// Listing route before the gallery has mounted.
    Loading,
    Detail {
        detail: DetailView<'a>,
        related: Vec<&'a ImageRecord>,
    },
    NotFound(RecordId),
}

pub struct GalleryApp {
    ctx: GalleryContext,
    related_count: usize,
    history: HistoryHandle,
    cache: ScrollCache,
    viewport: Size,
    gallery: Option<Gallery>,
}

impl GalleryApp {
    /// Create the app at the history's current route.
    pub fn new(
        store: MaterialStore,
        config: &GalleryConfig,
        history: HistoryHandle,
        session: Box<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        viewport: Size,
    ) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let ctx = GalleryContext::from_config(Rc::new(store), config, Rc::clone(&clock), events)?;
        let cache = ScrollCache::new(Box::new(history.clone()), session, clock)
            .with_expiry(config.cache_expiry());

        let mut app = Self {
            ctx,
            related_count: config.related_count,
            history,
            cache,
            viewport,
            gallery: None,
        };
        app.enter();
        Ok(app)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.ctx.events.subscribe()
    }

    pub fn route(&self) -> Route {
        self.history.current_route()
    }

    pub fn gallery(&self) -> Option<&Gallery> {
        self.gallery.as_ref()
    }

    pub fn cache(&self) -> &ScrollCache {
        &self.cache
    }

    pub fn store(&self) -> &MaterialStore {
        &self.ctx.store
    }

    // =====================================================================
    // Update
    // =====================================================================

    pub fn update(&mut self, message: GalleryMessage) {
        match message {
            GalleryMessage::Navigate(route) => self.navigate(route),
            GalleryMessage::Back => {
                if self.history.can_go_back() {
                    self.leave();
                    self.history.back();
                    self.enter();
                }
            }
            GalleryMessage::Forward => {
                if self.history.can_go_forward() {
                    self.leave();
                    self.history.forward();
                    self.enter();
                }
            }
            GalleryMessage::Key(key) => self.handle_key(key),

            GalleryMessage::Scroll(action) => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.scroll(action);
                }
            }
            GalleryMessage::Resize { width, height } => {
                self.viewport = Size::new(width, height);
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.resize(self.viewport, &mut self.cache);
                }
            }
            GalleryMessage::VisibilityHidden => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.persist_all(&mut self.cache);
                }
            }

            GalleryMessage::Tick => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.tick(&mut self.cache);
                }
            }
            GalleryMessage::AnimationFrame => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.animation_frame();
                }
            }

            GalleryMessage::ScrollToTop => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.scroll_to_top(&mut self.cache);
                }
            }
        }
    }

    // =====================================================================
    // View
    // =====================================================================

    pub fn view(&self) -> View<'_> {
        match self.history.current_route() {
            Route::Listing => match &self.gallery {
                Some(gallery) => View::Listing(gallery.render()),
                None => View::Loading,
            },
            Route::Detail(id) => match DetailView::resolve(&self.ctx.store, &id) {
                Ok(detail) => View::Detail {
                    related: related(&self.ctx.store, &id, self.related_count),
                    detail,
                },
                Err(_) => View::NotFound(id),
            },
        }
    }

    // =====================================================================
    // Navigation
    // =====================================================================

    fn navigate(&mut self, route: Route) {
        if route == self.history.current_route() {
            return;
        }
        self.leave();
        self.history.push(route);
        self.enter();
    }

    fn handle_key(&mut self, key: NavKey) {
        let Route::Detail(id) = self.history.current_route() else {
            return;
        };
        let store = Rc::clone(&self.ctx.store);
        let target = match DetailView::resolve(&store, &id) {
            Ok(detail) => detail.route_for(key),
            Err(_) => (key == NavKey::Escape).then_some(Route::Listing),
        };
        if let Some(route) = target {
            self.navigate(route);
        }
    }

    /// Mount what the current route needs.
    fn enter(&mut self) {
        let route = self.history.current_route();
        tracing::debug!(path = %route.path(), "entering route");
        if route.is_listing() {
            self.gallery = Some(Gallery::mount(self.ctx.clone(), self.viewport, &self.cache));
        }
    }

    /// Unmount the gallery, saving into the entry being left.
    fn leave(&mut self) {
        if let Some(gallery) = self.gallery.take() {
            gallery.unmount(&mut self.cache);
        }
    }
}
