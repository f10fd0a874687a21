//! Server-sent event feeds over the store change feed
//!
//! A feed renders a view, sends it, then re-renders whenever its collection
//! changes and sends again only when the rendered JSON differs. Lagged
//! receivers simply re-render.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast::{Receiver, error::RecvError};

use crate::db::{ChangeEvent, Collection, DocStore};
use crate::utils::AppResult;

const KEEP_ALIVE: Duration = Duration::from_secs(15);

struct Feed<F> {
    store: DocStore,
    rx: Receiver<ChangeEvent>,
    collection: Collection,
    event: &'static str,
    render: F,
    last: Option<String>,
}

async fn next_event<T, F>(mut feed: Feed<F>) -> Option<(Result<Event, Infallible>, Feed<F>)>
where
    T: Serialize,
    F: Fn(&DocStore) -> AppResult<T>,
{
    loop {
        if feed.last.is_some() {
            match feed.rx.recv().await {
                Ok(change) if change.collection != feed.collection => continue,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, event = feed.event, "Live feed lagged, resyncing");
                }
                Err(RecvError::Closed) => return None,
            }
        }

        let json = match (feed.render)(&feed.store).map(|view| serde_json::to_string(&view)) {
            Ok(Ok(json)) => json,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, event = feed.event, "Live feed serialization failed");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, event = feed.event, "Live feed render failed");
                return None;
            }
        };
        if feed.last.as_deref() == Some(json.as_str()) {
            continue;
        }
        feed.last = Some(json.clone());
        let event = Event::default().event(feed.event).data(json);
        return Some((Ok(event), feed));
    }
}

/// Event stream for `collection`; owns its store handle
pub fn feed<T, F>(
    store: DocStore,
    collection: Collection,
    event: &'static str,
    render: F,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static
where
    T: Serialize + Send + 'static,
    F: Fn(&DocStore) -> AppResult<T> + Send + Sync + 'static,
{
    // Subscribe before the first render so no change slips in between
    let rx = store.subscribe();
    let feed = Feed {
        store,
        rx,
        collection,
        event,
        render,
        last: None,
    };
    futures::stream::unfold(feed, next_event::<T, F>)
}

/// SSE response that follows `collection` and emits `render`'s output
pub fn watch<T, F>(
    store: DocStore,
    collection: Collection,
    event: &'static str,
    render: F,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static>
where
    T: Serialize + Send + 'static,
    F: Fn(&DocStore) -> AppResult<T> + Send + Sync + 'static,
{
    Sse::new(feed(store, collection, event, render)).keep_alive(KeepAlive::new().interval(KEEP_ALIVE))
}
