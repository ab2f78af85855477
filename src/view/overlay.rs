use super::feed::CONVERSATION_ATTR;
use super::tree::{Element, NodeId};
use super::SharedDocument;
use crate::api::models::{Envelope, Message};
use crate::api::Fetcher;
use crate::config::DashboardConfig;
use std::rc::Rc;

pub const BACKDROP_CLASS: &str = "ff-modal-backdrop";
pub const PANEL_CLASS: &str = "ff-modal-panel";
pub const CLOSE_CLASS: &str = "ff-modal-close";
pub const MESSAGE_CLASS: &str = "ff-modal-message";

/// Display form of an ISO-8601 timestamp; unparseable input is shown verbatim.
pub fn format_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Modal listing the messages of one conversation.
#[derive(Clone)]
pub struct DetailOverlay {
    doc: SharedDocument,
    fetcher: Fetcher,
    config: Rc<DashboardConfig>,
}

impl DetailOverlay {
    pub fn new(doc: SharedDocument, fetcher: Fetcher, config: Rc<DashboardConfig>) -> Self {
        Self {
            doc,
            fetcher,
            config,
        }
    }

    /// Fetch the conversation's messages and show them. Nothing is shown when
    /// the read fails, the body has no `results`, or there are no messages.
    pub async fn open(&self, conversation_id: i64) -> Option<NodeId> {
        let envelope: Envelope<Message> = self
            .fetcher
            .fetch_optional(&self.config.messages_locator(conversation_id))
            .await?;

        if envelope.results.is_empty() {
            log::debug!("No messages for conversation {}", conversation_id);
            return None;
        }
        self.build(conversation_id, &envelope)
    }

    fn build(&self, conversation_id: i64, envelope: &Envelope<Message>) -> Option<NodeId> {
        let placeholders = &self.config.placeholders;
        let mut doc = self.doc.borrow_mut();
        let root = doc.root();

        let backdrop = doc.append(
            root,
            Element::new("div")
                .key(format!("message-overlay-{}", uuid::Uuid::new_v4()))
                .class(BACKDROP_CLASS)
                .attr(CONVERSATION_ATTR, conversation_id.to_string()),
        )?;
        let panel = doc.append(
            backdrop,
            Element::new("div")
                .class(PANEL_CLASS)
                .attr("role", "dialog"),
        )?;

        if let Some(header) = doc.append(panel, Element::new("header")) {
            doc.append(
                header,
                Element::new("h2").text(format!("Messages ({})", envelope.total())),
            );
            doc.append(
                header,
                Element::new("button")
                    .class(CLOSE_CLASS)
                    .attr("aria-label", "Close")
                    .text("×"),
            );
        }

        let list = doc.append(panel, Element::new("ul"))?;
        for message in &envelope.results {
            let Some(item) = doc.append(list, Element::new("li").class(MESSAGE_CLASS)) else {
                continue;
            };
            let sender = message
                .sender
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(&placeholders.unknown_sender);
            let text = message
                .text
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(&placeholders.no_content);

            doc.append(item, Element::new("strong").class("ff-sender").text(sender));
            if let Some(sent_at) = message.sent_at.as_deref() {
                doc.append(
                    item,
                    Element::new("time")
                        .attr("datetime", sent_at)
                        .text(format_timestamp(sent_at)),
                );
            }
            doc.append(item, Element::new("p").text(text));
        }

        log::debug!(
            "Opened message overlay for conversation {} ({} messages)",
            conversation_id,
            envelope.results.len()
        );
        Some(backdrop)
    }

    /// Route a click that landed inside an overlay. Returns true when it dismissed one.
    /// Clicks on the content panel itself are ignored.
    pub fn handle_click(&self, target: NodeId) -> bool {
        let overlay = {
            let doc = self.doc.borrow();
            match doc.closest(target, CLOSE_CLASS) {
                Some(close) => doc.closest(close, BACKDROP_CLASS),
                None => doc
                    .get(target)
                    .filter(|e| e.has_class(BACKDROP_CLASS))
                    .map(|_| target),
            }
        };
        match overlay {
            Some(overlay) => self.dismiss(overlay),
            None => false,
        }
    }

    pub fn dismiss(&self, overlay: NodeId) -> bool {
        let mut doc = self.doc.borrow_mut();
        if !doc.get(overlay).is_some_and(|e| e.has_class(BACKDROP_CLASS)) {
            return false;
        }
        doc.remove(overlay)
    }

    pub fn open_overlays(&self) -> Vec<NodeId> {
        self.doc.borrow().find_by_class(BACKDROP_CLASS)
    }
}
