use serde::{Deserialize, Serialize};

/// Wrapper returned by every collection endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Envelope<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub num_pages: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
}

impl<T> Envelope<T> {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            count: None,
            num_pages: None,
            page: None,
        }
    }

    /// Reported total when the server supplies one, otherwise the page length.
    pub fn total(&self) -> u64 {
        self.count.unwrap_or(self.results.len() as u64)
    }
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Conversation {
    pub id: i64,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
    /// Only populated by the detail endpoint.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Conversation {
    pub fn first_annotation(&self, kind: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.kind == kind)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Annotation {
    #[serde(default)]
    pub id: Option<i64>,
    pub kind: String,
    #[serde(default)]
    pub content_text: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Action {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub workspace: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub conversation_id: Option<i64>,
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

/// Conversation triage buckets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Urgent,
    Action,
    Fyi,
    Spam,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::Action,
        Priority::Fyi,
        Priority::Spam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::Action => "action",
            Priority::Fyi => "fyi",
            Priority::Spam => "spam",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
    Dismissed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::Doing,
        TaskStatus::Done,
        TaskStatus::Dismissed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
            TaskStatus::Dismissed => "dismissed",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_prefers_reported_count() {
        let env: Envelope<Action> = serde_json::from_str(
            r#"{"results": [{"id": 1, "status": "todo"}], "count": 42, "num_pages": 3, "page": 1}"#,
        )
        .unwrap();
        assert_eq!(env.total(), 42);

        let env: Envelope<Action> =
            serde_json::from_str(r#"{"results": [{"id": 1}, {"id": 2}]}"#).unwrap();
        assert_eq!(env.total(), 2);
    }

    #[test]
    fn envelope_requires_results() {
        let parsed = serde_json::from_str::<Envelope<Message>>(r#"{"count": 0}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn conversation_detail_carries_annotations() {
        let conv: Conversation = serde_json::from_str(
            r#"{
                "id": 7,
                "subject": null,
                "priority": "URGENT",
                "unread_count": 3,
                "annotations": [
                    {"kind": "priority", "content_text": "high"},
                    {"kind": "summary", "content_text": "Client wants the deck by Friday"},
                    {"kind": "summary", "content_text": "older summary"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(conv.subject, None);
        let summary = conv.first_annotation("summary").unwrap();
        assert_eq!(
            summary.content_text.as_deref(),
            Some("Client wants the deck by Friday")
        );
        assert!(conv.first_annotation("task").is_none());
    }

    #[test]
    fn canonical_labels() {
        assert_eq!(Priority::labels(), vec!["urgent", "action", "fyi", "spam"]);
        assert_eq!(TaskStatus::labels(), vec!["todo", "doing", "done", "dismissed"]);
    }
}
