use crate::view::feed::{CONVERSATION_ATTR, VIEW_MESSAGES_CLASS};
use crate::view::tree::{Document, NodeId};

/// Conversation id carried by the "view messages" control at or above `target`.
pub fn conversation_for_click(doc: &Document, target: NodeId) -> Option<i64> {
    let button = doc.closest(target, VIEW_MESSAGES_CLASS)?;
    let raw = doc.get(button)?.attrs.get(CONVERSATION_ATTR)?;
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            log::warn!("Ignoring view-messages control with bad id {:?}", raw);
            None
        }
    }
}
