pub mod aggregate;

use crate::api::models::{Action, Conversation, Envelope, Priority, TaskStatus};
use crate::config::Placeholders;
use aggregate::{aggregate_counts, distinct_count, nested_count, Series};
use serde::Serialize;

pub const SUMMARY_KIND: &str = "summary";

/// Values behind the four counter tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub conversations: u64,
    pub tasks: u64,
    pub summaries: u64,
    pub workspaces: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub stats: SummaryStats,
    pub by_source: Series,
    pub by_priority: Series,
    pub by_status: Series,
}

impl Analytics {
    pub fn compute(
        conversations: &Envelope<Conversation>,
        actions: &Envelope<Action>,
        placeholders: &Placeholders,
    ) -> Self {
        let convs = conversations.results.as_slice();
        let unknown = placeholders.unknown_source.as_str();

        // A missing workspace still counts as one bucket; zero floors at one.
        let workspaces = distinct_count(convs, |c| c.workspace.as_deref()).max(1);

        let stats = SummaryStats {
            conversations: conversations.total(),
            tasks: actions.total(),
            summaries: nested_count(
                convs,
                |c| c.annotations.as_slice(),
                |a| a.kind == SUMMARY_KIND,
            ),
            workspaces,
        };

        let by_source = aggregate_counts(
            convs,
            |c| Some(c.stream.as_deref().filter(|s| !s.is_empty()).unwrap_or(unknown)),
            None,
        );
        let by_priority = aggregate_counts(
            convs,
            |c| c.priority.as_deref(),
            Some(Priority::labels().as_slice()),
        );
        let by_status = aggregate_counts(
            actions.results.as_slice(),
            |t| t.status.as_deref(),
            Some(TaskStatus::labels().as_slice()),
        );

        Self {
            stats,
            by_source,
            by_priority,
            by_status,
        }
    }
}
