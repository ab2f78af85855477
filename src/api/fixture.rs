use super::FetchError;
use crate::config::DashboardConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Canned response for one locator.
#[derive(Debug, Clone)]
pub enum Route {
    Json(Value),
    Status(u16),
    Unreachable,
    Delayed(Duration, Box<Route>),
}

impl Route {
    pub fn delayed(millis: u64, route: Route) -> Self {
        Route::Delayed(Duration::from_millis(millis), Box::new(route))
    }
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<String, Route>,
    requests: Vec<String>,
}

/// In-memory backend keyed by exact locator. Unknown locators answer 404.
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    inner: Arc<Mutex<Inner>>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, locator: impl Into<String>, route: Route) {
        self.lock().routes.insert(locator.into(), route);
    }

    /// Every locator requested so far, in issue order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub async fn get(&self, locator: &str) -> Result<Value, FetchError> {
        let mut route = {
            let mut inner = self.lock();
            inner.requests.push(locator.to_string());
            inner
                .routes
                .get(locator)
                .cloned()
                .unwrap_or(Route::Status(404))
        };

        loop {
            match route {
                Route::Delayed(delay, next) => {
                    tokio::time::sleep(delay).await;
                    route = *next;
                }
                Route::Json(value) => return Ok(value),
                Route::Status(status) => return Err(FetchError::Status { status }),
                Route::Unreachable => {
                    return Err(FetchError::Unreachable(locator.to_string()));
                }
            }
        }
    }

    /// Small demo data set: one workspace, one inbox, two threads, two tasks.
    pub fn demo(config: &DashboardConfig) -> Self {
        let store = Self::new();
        let now = chrono::Utc::now().to_rfc3339();

        let welcome = json!({
            "id": 1,
            "workspace": "Demo Workspace",
            "stream": "Inbox",
            "subject": "Welcome to FocusFlow Demo",
            "priority": "action",
            "state": "open",
            "last_message_at": now,
            "unread_count": 2,
        });
        let report = json!({
            "id": 2,
            "workspace": "Demo Workspace",
            "stream": "Inbox",
            "subject": "Weekly Report Review",
            "priority": "urgent",
            "state": "open",
            "last_message_at": now,
            "unread_count": 1,
        });

        store.insert(
            config.conversations_locator(),
            Route::Json(json!({
                "results": [welcome, report],
                "count": 2,
                "num_pages": 1,
                "page": 1,
            })),
        );

        let mut welcome_detail = welcome.clone();
        welcome_detail["annotations"] = json!([{
            "id": 1,
            "kind": "summary",
            "content_text": "Alice sent a demo email so you can see summaries.",
            "score": 0.9,
        }]);
        let mut report_detail = report.clone();
        report_detail["annotations"] = json!([]);
        store.insert(
            config.conversation_locator(1),
            Route::Json(welcome_detail),
        );
        store.insert(config.conversation_locator(2), Route::Json(report_detail));

        store.insert(
            config.actions_locator(),
            Route::Json(json!({
                "results": [
                    {"id": 1, "title": "Reply to Alice", "status": "todo", "workspace": "Demo Workspace"},
                    {"id": 2, "title": "Submit weekly report", "status": "doing", "workspace": "Demo Workspace"},
                ],
                "count": 2,
                "num_pages": 1,
                "page": 1,
            })),
        );

        store.insert(
            config.messages_locator(1),
            Route::Json(json!({
                "results": [{
                    "id": 1,
                    "conversation_id": 1,
                    "stream": "Inbox",
                    "sender": "Alice Johnson",
                    "sent_at": now,
                    "text": "Hey! Here's a demo email message so you can see summaries.",
                    "is_read": false,
                }],
                "count": 1,
            })),
        );
        store.insert(
            config.messages_locator(2),
            Route::Json(json!({
                "results": [{
                    "id": 2,
                    "conversation_id": 2,
                    "stream": "Inbox",
                    "sender": "Bob Lee",
                    "sent_at": now,
                    "text": "Don't forget to submit the weekly report by Friday.",
                    "is_read": false,
                }],
                "count": 1,
            })),
        );

        store
    }
}
