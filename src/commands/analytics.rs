use crate::api::models::{Action, Conversation, Envelope};
use crate::api::Fetcher;
use crate::config::DashboardConfig;
use crate::dashboard::Analytics;
use crate::view::charts::{render_chart, ChartSpec};
use crate::view::tree::Document;
use crate::view::{
    SharedDocument, CHART_BY_PRIORITY, CHART_BY_SOURCE, CHART_TASKS, STAT_CONVERSATIONS,
    STAT_SUMMARIES, STAT_TASKS, STAT_WORKSPACES,
};

/// Bulk-load both collections, aggregate, then paint counters and charts.
pub async fn load_analytics(
    doc: &SharedDocument,
    fetcher: &Fetcher,
    config: &DashboardConfig,
) -> Analytics {
    let conversations: Envelope<Conversation> = fetcher
        .fetch_collection(&config.conversations_locator())
        .await;
    let actions: Envelope<Action> = fetcher.fetch_collection(&config.actions_locator()).await;

    let analytics = Analytics::compute(&conversations, &actions, &config.placeholders);
    render_analytics(&mut doc.borrow_mut(), &analytics);
    analytics
}

pub fn render_analytics(doc: &mut Document, analytics: &Analytics) {
    let stats = analytics.stats;
    for (key, value) in [
        (STAT_CONVERSATIONS, stats.conversations),
        (STAT_TASKS, stats.tasks),
        (STAT_SUMMARIES, stats.summaries),
        (STAT_WORKSPACES, stats.workspaces),
    ] {
        if let Some(id) = doc.by_key(key) {
            doc.set_text(id, value.to_string());
        }
    }

    render_chart(
        doc,
        CHART_BY_SOURCE,
        &ChartSpec::proportion("Messages", &analytics.by_source),
    );
    render_chart(
        doc,
        CHART_BY_PRIORITY,
        &ChartSpec::magnitude("Conversations", &analytics.by_priority),
    );
    render_chart(
        doc,
        CHART_TASKS,
        &ChartSpec::trend("Tasks", &analytics.by_status),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixture::{FixtureStore, Route};
    use crate::api::Backend;
    use crate::view::charts::bound_chart;
    use crate::view::tree::Element;
    use crate::view::{dashboard_skeleton, shared};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn counters(doc: &Document) -> Vec<String> {
        [STAT_CONVERSATIONS, STAT_TASKS, STAT_SUMMARIES, STAT_WORKSPACES]
            .iter()
            .map(|k| doc.text_of(k).unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn failed_bulk_load_renders_zero_state() {
        let store = FixtureStore::new();
        let config = DashboardConfig::default();
        store.insert(config.conversations_locator(), Route::Unreachable);
        store.insert(config.actions_locator(), Route::Status(500));
        let doc = shared(dashboard_skeleton());

        let analytics =
            load_analytics(&doc, &Fetcher::new(Backend::Fixture(store)), &config).await;

        let doc = doc.borrow();
        assert_eq!(counters(&doc), vec!["0", "0", "0", "1"]);
        assert_eq!(analytics.by_priority.values(), vec![0, 0, 0, 0]);
        let priority = bound_chart(&doc, CHART_BY_PRIORITY).unwrap();
        assert_eq!(
            priority["data"]["labels"],
            json!(["urgent", "action", "fyi", "spam"])
        );
        assert_eq!(priority["data"]["datasets"][0]["data"], json!([0, 0, 0, 0]));
        let tasks = bound_chart(&doc, CHART_TASKS).unwrap();
        assert_eq!(
            tasks["data"]["labels"],
            json!(["todo", "doing", "done", "dismissed"])
        );
    }

    #[tokio::test]
    async fn demo_data_fills_counters_and_charts() {
        let config = DashboardConfig::default();
        let store = FixtureStore::demo(&config);
        let doc = shared(dashboard_skeleton());

        load_analytics(&doc, &Fetcher::new(Backend::Fixture(store)), &config).await;

        let doc = doc.borrow();
        // List endpoint carries no annotations, so summaries stay at zero.
        assert_eq!(counters(&doc), vec!["2", "2", "0", "1"]);
        let source = bound_chart(&doc, CHART_BY_SOURCE).unwrap();
        assert_eq!(source["type"], "doughnut");
        assert_eq!(source["data"]["labels"], json!(["Inbox"]));
        assert_eq!(source["data"]["datasets"][0]["data"], json!([2]));
        let priority = bound_chart(&doc, CHART_BY_PRIORITY).unwrap();
        assert_eq!(priority["data"]["datasets"][0]["data"], json!([1, 1, 0, 0]));
    }

    #[test]
    fn missing_anchors_degrade_silently() {
        let mut doc = Document::new();
        doc.append(doc.root(), Element::new("span").key(STAT_TASKS));
        let analytics = Analytics::compute(
            &Envelope::empty(),
            &Envelope::empty(),
            &Default::default(),
        );

        render_analytics(&mut doc, &analytics);

        assert_eq!(doc.text_of(STAT_TASKS), Some("0"));
        assert!(bound_chart(&doc, CHART_TASKS).is_none());
    }
}
