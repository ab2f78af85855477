use super::tree::{Element, NodeId};
use super::{SharedDocument, FEED, FEED_EMPTY};
use crate::api::models::{Conversation, Envelope};
use crate::api::Fetcher;
use crate::config::DashboardConfig;
use crate::dashboard::SUMMARY_KIND;
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use std::cell::Cell;
use std::rc::Rc;

pub const CARD_CLASS: &str = "ff-card";
pub const SUMMARY_CLASS: &str = "ff-card-summary";
pub const LOADING_CLASS: &str = "ff-feed-loading";
pub const VIEW_MESSAGES_CLASS: &str = "ff-view-messages";
pub const CONVERSATION_ATTR: &str = "data-conversation-id";

pub fn card_key(id: i64) -> String {
    format!("conv-{}", id)
}

pub fn summary_key(id: i64) -> String {
    format!("conv-summary-{}", id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Loading,
    Populated(usize),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Summarized,
    NoSummary,
    Failed,
    Stale,
}

/// Tally of one enrichment wave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub summarized: usize,
    pub no_summary: usize,
    pub failed: usize,
    pub stale: usize,
}

impl EnrichmentReport {
    fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let count = |o: Outcome| outcomes.iter().filter(|x| **x == o).count();
        Self {
            summarized: count(Outcome::Summarized),
            no_summary: count(Outcome::NoSummary),
            failed: count(Outcome::Failed),
            stale: count(Outcome::Stale),
        }
    }
}

/// Per-card enrichment still to run. Must be polled on the UI thread.
pub type Enrichment = LocalBoxFuture<'static, EnrichmentReport>;

#[derive(Clone)]
pub struct FeedRenderer {
    doc: SharedDocument,
    fetcher: Fetcher,
    config: Rc<DashboardConfig>,
    state: Rc<Cell<FeedState>>,
}

impl FeedRenderer {
    pub fn new(doc: SharedDocument, fetcher: Fetcher, config: Rc<DashboardConfig>) -> Self {
        Self {
            doc,
            fetcher,
            config,
            state: Rc::new(Cell::new(FeedState::Idle)),
        }
    }

    pub fn state(&self) -> FeedState {
        self.state.get()
    }

    /// One render cycle. Returns once the cards (or the empty state) are in
    /// the tree; the returned future runs the per-card enrichment wave.
    pub async fn render(&self) -> Enrichment {
        if self.doc.borrow().by_key(FEED).is_none() {
            log::debug!("Feed container not present, skipping render");
            self.state.set(FeedState::Idle);
            return future::ready(EnrichmentReport::default()).boxed_local();
        }

        self.enter_loading();

        let envelope: Option<Envelope<Conversation>> = self
            .fetcher
            .fetch_optional(&self.config.conversations_locator())
            .await;
        let conversations = envelope.map(|e| e.results).unwrap_or_default();

        if conversations.is_empty() {
            self.show_empty();
            return future::ready(EnrichmentReport::default()).boxed_local();
        }

        let targets = self.populate(&conversations);
        log::info!("Feed rendered {} conversations", targets.len());
        self.enrich(targets).boxed_local()
    }

    fn enter_loading(&self) {
        self.state.set(FeedState::Loading);
        let mut doc = self.doc.borrow_mut();
        if let Some(empty) = doc.by_key(FEED_EMPTY) {
            doc.set_hidden(empty, true);
        }
        if let Some(feed) = doc.by_key(FEED) {
            doc.clear_children(feed);
            doc.append(
                feed,
                Element::new("p")
                    .class(LOADING_CLASS)
                    .text(self.config.placeholders.loading_feed.as_str()),
            );
        }
    }

    fn show_empty(&self) {
        let mut doc = self.doc.borrow_mut();
        if let Some(feed) = doc.by_key(FEED) {
            doc.clear_children(feed);
        }
        if let Some(empty) = doc.by_key(FEED_EMPTY) {
            doc.set_hidden(empty, false);
        }
        self.state.set(FeedState::Empty);
    }

    fn populate(&self, conversations: &[Conversation]) -> Vec<(i64, NodeId)> {
        let placeholders = &self.config.placeholders;
        let mut doc = self.doc.borrow_mut();
        let mut targets = Vec::with_capacity(conversations.len());

        if let Some(empty) = doc.by_key(FEED_EMPTY) {
            doc.set_hidden(empty, true);
        }
        let Some(feed) = doc.by_key(FEED) else {
            return targets;
        };
        doc.clear_children(feed);

        for conv in conversations {
            let id = conv.id.to_string();
            let Some(card) = doc.append(
                feed,
                Element::new("article")
                    .key(card_key(conv.id))
                    .class(CARD_CLASS)
                    .attr(CONVERSATION_ATTR, id.as_str()),
            ) else {
                continue;
            };

            let priority = conv
                .priority
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_else(|| "none".to_string());
            let subject = conv
                .subject
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(&placeholders.no_subject);
            let stream = conv
                .stream
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(&placeholders.unknown_source);
            let caption = match conv.workspace.as_deref() {
                Some(workspace) => format!("{} · {}", workspace, stream),
                None => stream.to_string(),
            };

            doc.append(card, Element::new("span").class("ff-card-id").text(format!("#{}", id)));
            doc.append(card, Element::new("h3").class("ff-card-subject").text(subject));
            doc.append(
                card,
                Element::new("span")
                    .class("ff-badge")
                    .class(&format!("ff-badge-{}", priority))
                    .text(priority.as_str()),
            );
            doc.append(card, Element::new("p").class("ff-card-meta").text(caption));
            doc.append(
                card,
                Element::new("span")
                    .class("ff-unread")
                    .text(format!("{} unread", conv.unread_count)),
            );
            let summary = doc.append(
                card,
                Element::new("p")
                    .key(summary_key(conv.id))
                    .class(SUMMARY_CLASS)
                    .text(placeholders.summary_pending.as_str()),
            );
            doc.append(
                card,
                Element::new("button")
                    .class(VIEW_MESSAGES_CLASS)
                    .class("btn-ghost")
                    .attr(CONVERSATION_ATTR, id.as_str())
                    .text("View messages"),
            );

            if let Some(summary) = summary {
                targets.push((conv.id, summary));
            }
        }

        self.state.set(FeedState::Populated(targets.len()));
        targets
    }

    fn enrich(&self, targets: Vec<(i64, NodeId)>) -> impl std::future::Future<Output = EnrichmentReport> {
        let doc = self.doc.clone();
        let fetcher = self.fetcher.clone();
        let config = self.config.clone();

        async move {
            let waves = targets.into_iter().map(|(id, node)| {
                let doc = doc.clone();
                let fetcher = fetcher.clone();
                let config = config.clone();
                async move { enrich_card(&doc, &fetcher, &config, id, node).await }
            });
            let outcomes = future::join_all(waves).await;
            let report = EnrichmentReport::from_outcomes(&outcomes);
            log::info!(
                "Enrichment finished: {} summarized, {} without summary, {} failed, {} stale",
                report.summarized,
                report.no_summary,
                report.failed,
                report.stale
            );
            report
        }
    }
}

async fn enrich_card(
    doc: &SharedDocument,
    fetcher: &Fetcher,
    config: &DashboardConfig,
    id: i64,
    node: NodeId,
) -> Outcome {
    let detail: Option<Conversation> = fetcher
        .fetch_optional(&config.conversation_locator(id))
        .await;
    // Failed detail reads keep the pending placeholder.
    let Some(detail) = detail else {
        return Outcome::Failed;
    };

    let summary = detail
        .first_annotation(SUMMARY_KIND)
        .and_then(|a| a.content_text.as_deref())
        .filter(|t| !t.trim().is_empty());
    let (text, outcome) = match summary {
        Some(text) => (text, Outcome::Summarized),
        None => (config.placeholders.summary_missing.as_str(), Outcome::NoSummary),
    };

    let mut doc = doc.borrow_mut();
    // The card may belong to a render cycle that has since been replaced.
    if doc.by_key(&summary_key(id)) != Some(node) || !doc.set_text(node, text) {
        log::debug!("Summary target for conversation {} is gone", id);
        return Outcome::Stale;
    }
    outcome
}
