pub mod analytics;
pub mod messages;

use crate::api::{Backend, Fetcher};
use crate::config::DashboardConfig;
use crate::dashboard::Analytics;
use crate::view::feed::{Enrichment, FeedRenderer, FeedState};
use crate::view::overlay::{DetailOverlay, BACKDROP_CLASS};
use crate::view::tree::{Document, NodeId};
use crate::view::{dashboard_skeleton, shared, SharedDocument, REFRESH};
use std::rc::Rc;

/// Events the host forwards to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Page is ready.
    Load,
    Click { target: NodeId },
}

pub enum Reaction {
    Ignored,
    /// Counters, charts and feed cards are painted; `enrichment` fills in
    /// card summaries and must be driven on the UI thread.
    Rendered {
        analytics: Analytics,
        feed: FeedState,
        enrichment: Enrichment,
    },
    OverlayOpened(NodeId),
    /// The overlay fetch produced nothing to show.
    OverlaySkipped,
    OverlayDismissed,
}

enum Hit {
    Refresh,
    ViewMessages(i64),
    Overlay,
}

/// Holds a control disabled until dropped, including when the owning
/// future is cancelled mid-refresh.
struct BusyControl {
    doc: SharedDocument,
    control: NodeId,
}

impl BusyControl {
    /// `None` when the control is already disabled.
    fn acquire(doc: &SharedDocument, control: NodeId) -> Option<Self> {
        let mut guard = doc.borrow_mut();
        if guard
            .get(control)
            .is_some_and(|e| e.attrs.contains_key(DISABLED_ATTR))
        {
            return None;
        }
        guard.set_attr(control, DISABLED_ATTR, Some(DISABLED_ATTR));
        Some(Self {
            doc: doc.clone(),
            control,
        })
    }
}

impl Drop for BusyControl {
    fn drop(&mut self) {
        if let Ok(mut doc) = self.doc.try_borrow_mut() {
            doc.set_attr(self.control, DISABLED_ATTR, None);
        } else {
            log::warn!("Document busy, refresh control left disabled");
        }
    }
}

const DISABLED_ATTR: &str = "disabled";

pub struct Dashboard {
    doc: SharedDocument,
    fetcher: Fetcher,
    config: Rc<DashboardConfig>,
    feed: FeedRenderer,
    overlay: DetailOverlay,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, backend: Backend) -> Self {
        Self::with_document(dashboard_skeleton(), config, backend)
    }

    pub fn with_document(doc: Document, config: DashboardConfig, backend: Backend) -> Self {
        let doc = shared(doc);
        let fetcher = Fetcher::new(backend);
        let config = Rc::new(config);
        Self {
            feed: FeedRenderer::new(doc.clone(), fetcher.clone(), config.clone()),
            overlay: DetailOverlay::new(doc.clone(), fetcher.clone(), config.clone()),
            doc,
            fetcher,
            config,
        }
    }

    pub fn document(&self) -> SharedDocument {
        self.doc.clone()
    }

    pub fn feed_state(&self) -> FeedState {
        self.feed.state()
    }

    pub async fn handle(&self, event: UiEvent) -> Reaction {
        match event {
            UiEvent::Load => self.render_all().await,
            UiEvent::Click { target } => match self.hit_test(target) {
                Some(Hit::Refresh) => self.refresh().await,
                Some(Hit::ViewMessages(id)) => match self.overlay.open(id).await {
                    Some(node) => Reaction::OverlayOpened(node),
                    None => Reaction::OverlaySkipped,
                },
                Some(Hit::Overlay) => {
                    if self.overlay.handle_click(target) {
                        Reaction::OverlayDismissed
                    } else {
                        Reaction::Ignored
                    }
                }
                None => Reaction::Ignored,
            },
        }
    }

    fn hit_test(&self, target: NodeId) -> Option<Hit> {
        let doc = self.doc.borrow();
        // Overlays sit above the page, so they take the click first.
        if doc.closest(target, BACKDROP_CLASS).is_some() {
            return Some(Hit::Overlay);
        }
        if let Some(refresh) = doc.by_key(REFRESH) {
            if doc.ancestors(target).any(|n| n == refresh) {
                return Some(Hit::Refresh);
            }
        }
        messages::conversation_for_click(&doc, target).map(Hit::ViewMessages)
    }

    async fn refresh(&self) -> Reaction {
        let button = self.doc.borrow().by_key(REFRESH);
        let _busy = match button {
            Some(button) => match BusyControl::acquire(&self.doc, button) {
                Some(busy) => Some(busy),
                None => return Reaction::Ignored,
            },
            None => None,
        };
        self.render_all().await
    }

    async fn render_all(&self) -> Reaction {
        let analytics = analytics::load_analytics(&self.doc, &self.fetcher, &self.config).await;
        let enrichment = self.feed.render().await;
        Reaction::Rendered {
            analytics,
            feed: self.feed.state(),
            enrichment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixture::{FixtureStore, Route};
    use crate::view::feed::{summary_key, VIEW_MESSAGES_CLASS};
    use crate::view::overlay::{CLOSE_CLASS, PANEL_CLASS};
    use crate::view::{FEED_EMPTY, STAT_CONVERSATIONS};
    use futures::FutureExt;
    use serde_json::json;

    fn demo() -> (Dashboard, FixtureStore) {
        let config = DashboardConfig::default();
        let store = FixtureStore::demo(&config);
        (
            Dashboard::new(config, Backend::Fixture(store.clone())),
            store,
        )
    }

    fn first_with_class(dashboard: &Dashboard, class: &str) -> NodeId {
        dashboard.document().borrow().find_by_class(class)[0]
    }

    #[tokio::test]
    async fn load_paints_everything_then_enriches() {
        let (dashboard, _store) = demo();

        let Reaction::Rendered {
            analytics,
            feed,
            enrichment,
        } = dashboard.handle(UiEvent::Load).await
        else {
            panic!("load should render");
        };
        assert_eq!(analytics.stats.conversations, 2);
        assert_eq!(feed, FeedState::Populated(2));

        let report = enrichment.await;
        assert_eq!(report.summarized, 1);
        assert_eq!(report.no_summary, 1);

        let doc = dashboard.document();
        let doc = doc.borrow();
        assert_eq!(doc.text_of(STAT_CONVERSATIONS), Some("2"));
        assert_eq!(
            doc.text_of(&summary_key(1)),
            Some("Alice sent a demo email so you can see summaries.")
        );
        assert_eq!(doc.text_of(&summary_key(2)), Some("No summary yet"));
    }

    #[tokio::test]
    async fn refresh_click_rerenders_without_duplicates() {
        let (dashboard, _store) = demo();
        if let Reaction::Rendered { enrichment, .. } = dashboard.handle(UiEvent::Load).await {
            enrichment.await;
        }
        let nodes = dashboard.document().borrow().len();

        let refresh = dashboard.document().borrow().by_key(REFRESH).unwrap();
        let Reaction::Rendered { enrichment, .. } =
            dashboard.handle(UiEvent::Click { target: refresh }).await
        else {
            panic!("refresh should render");
        };
        enrichment.await;

        let doc = dashboard.document();
        let doc = doc.borrow();
        assert_eq!(doc.len(), nodes);
        assert!(!doc.get(refresh).unwrap().attrs.contains_key("disabled"));
    }

    #[tokio::test]
    async fn abandoned_refresh_releases_the_control() {
        let (dashboard, store) = demo();
        let _ = dashboard.handle(UiEvent::Load).await;
        let config = DashboardConfig::default();
        store.insert(
            config.actions_locator(),
            Route::delayed(20, Route::Json(json!({"results": [], "count": 0}))),
        );
        let refresh = dashboard.document().borrow().by_key(REFRESH).unwrap();

        let in_flight = dashboard
            .handle(UiEvent::Click { target: refresh })
            .now_or_never();
        assert!(in_flight.is_none());
        assert!(!dashboard
            .document()
            .borrow()
            .get(refresh)
            .unwrap()
            .attrs
            .contains_key(DISABLED_ATTR));

        assert!(matches!(
            dashboard.handle(UiEvent::Click { target: refresh }).await,
            Reaction::Rendered { .. }
        ));
    }

    #[tokio::test]
    async fn click_during_refresh_is_ignored() {
        let (dashboard, store) = demo();
        let config = DashboardConfig::default();
        store.insert(
            config.actions_locator(),
            Route::delayed(20, Route::Json(json!({"results": [], "count": 0}))),
        );
        let refresh = dashboard.document().borrow().by_key(REFRESH).unwrap();

        let (first, second) = futures::join!(
            dashboard.handle(UiEvent::Click { target: refresh }),
            dashboard.handle(UiEvent::Click { target: refresh })
        );
        assert!(matches!(first, Reaction::Rendered { .. }));
        assert!(matches!(second, Reaction::Ignored));
    }

    #[tokio::test]
    async fn refresh_to_empty_shows_empty_state() {
        let (dashboard, store) = demo();
        let _ = dashboard.handle(UiEvent::Load).await;

        let config = DashboardConfig::default();
        store.insert(config.conversations_locator(), Route::Unreachable);
        let refresh = dashboard.document().borrow().by_key(REFRESH).unwrap();
        let _ = dashboard.handle(UiEvent::Click { target: refresh }).await;

        assert_eq!(dashboard.feed_state(), FeedState::Empty);
        let doc = dashboard.document();
        let doc = doc.borrow();
        let empty = doc.by_key(FEED_EMPTY).and_then(|id| doc.get(id)).unwrap();
        assert!(!empty.hidden);
        assert_eq!(doc.text_of(STAT_CONVERSATIONS), Some("0"));
    }

    #[tokio::test]
    async fn view_messages_then_backdrop_dismiss() {
        let (dashboard, _store) = demo();
        let _ = dashboard.handle(UiEvent::Load).await;

        let button = first_with_class(&dashboard, VIEW_MESSAGES_CLASS);
        let Reaction::OverlayOpened(modal) =
            dashboard.handle(UiEvent::Click { target: button }).await
        else {
            panic!("overlay should open");
        };

        // Clicking inside the panel keeps it open.
        let panel = first_with_class(&dashboard, PANEL_CLASS);
        assert!(matches!(
            dashboard.handle(UiEvent::Click { target: panel }).await,
            Reaction::Ignored
        ));

        assert!(matches!(
            dashboard.handle(UiEvent::Click { target: modal }).await,
            Reaction::OverlayDismissed
        ));
        assert!(dashboard
            .document()
            .borrow()
            .find_by_class(BACKDROP_CLASS)
            .is_empty());

        let button = dashboard.document().borrow().find_by_class(VIEW_MESSAGES_CLASS)[1];
        assert!(matches!(
            dashboard.handle(UiEvent::Click { target: button }).await,
            Reaction::OverlayOpened(_)
        ));
        assert_eq!(
            dashboard.document().borrow().find_by_class(BACKDROP_CLASS).len(),
            1
        );

        let close = first_with_class(&dashboard, CLOSE_CLASS);
        assert!(matches!(
            dashboard.handle(UiEvent::Click { target: close }).await,
            Reaction::OverlayDismissed
        ));
    }

    #[tokio::test]
    async fn empty_message_list_skips_overlay() {
        let (dashboard, store) = demo();
        let _ = dashboard.handle(UiEvent::Load).await;
        let config = DashboardConfig::default();
        store.insert(
            config.messages_locator(1),
            Route::Json(json!({"results": [], "count": 0})),
        );

        let button = first_with_class(&dashboard, VIEW_MESSAGES_CLASS);
        assert!(matches!(
            dashboard.handle(UiEvent::Click { target: button }).await,
            Reaction::OverlaySkipped
        ));
        assert!(dashboard
            .document()
            .borrow()
            .find_by_class(BACKDROP_CLASS)
            .is_empty());
    }

    #[tokio::test]
    async fn unrelated_clicks_are_ignored() {
        let (dashboard, _store) = demo();
        let root = dashboard.document().borrow().root();
        assert!(matches!(
            dashboard.handle(UiEvent::Click { target: root }).await,
            Reaction::Ignored
        ));
    }
}
