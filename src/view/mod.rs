pub mod charts;
pub mod feed;
pub mod overlay;
pub mod tree;

use std::cell::RefCell;
use std::rc::Rc;
use tree::{Document, Element};

/// The presentation tree is shared by every task on the UI thread.
pub type SharedDocument = Rc<RefCell<Document>>;

// ── Anchors ──

pub const STAT_CONVERSATIONS: &str = "statConversations";
pub const STAT_TASKS: &str = "statTasks";
pub const STAT_SUMMARIES: &str = "statSummaries";
pub const STAT_WORKSPACES: &str = "statWorkspaces";

pub const CHART_BY_SOURCE: &str = "chartMessagesBySource";
pub const CHART_BY_PRIORITY: &str = "chartConversationsByPriority";
pub const CHART_TASKS: &str = "chartTasksCompletion";

pub const FEED: &str = "feed";
pub const FEED_EMPTY: &str = "feed-empty";
pub const REFRESH: &str = "refresh-btn";

/// Page with every anchor the dashboard knows about.
pub fn dashboard_skeleton() -> Document {
    let mut doc = Document::new();
    let root = doc.root();

    if let Some(stats) = doc.append(root, Element::new("section").class("ff-stats")) {
        for key in [STAT_CONVERSATIONS, STAT_TASKS, STAT_SUMMARIES, STAT_WORKSPACES] {
            doc.append(stats, Element::new("span").key(key).class("ff-stat").text("–"));
        }
    }

    if let Some(charts) = doc.append(root, Element::new("section").class("ff-charts")) {
        for key in [CHART_BY_SOURCE, CHART_BY_PRIORITY, CHART_TASKS] {
            doc.append(charts, Element::new("div").key(key).class("ff-chart"));
        }
    }

    if let Some(toolbar) = doc.append(root, Element::new("div").class("ff-toolbar")) {
        doc.append(
            toolbar,
            Element::new("button")
                .key(REFRESH)
                .class("btn-secondary")
                .text("Refresh"),
        );
    }
    doc.append(root, Element::new("div").key(FEED).class("ff-feed"));
    doc.append(
        root,
        Element::new("div")
            .key(FEED_EMPTY)
            .class("ff-empty")
            .text("Nothing in your feed yet.")
            .hidden(true),
    );

    doc
}

pub fn shared(doc: Document) -> SharedDocument {
    Rc::new(RefCell::new(doc))
}
