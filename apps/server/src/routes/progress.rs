//! SSE progress streams.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use vertcut_render_engine::watch_job;

use crate::state::AppState;

/// `GET /progress/:job_id` (and `/export-progress/:job_id`).
///
/// One event per poll tick; the stream ends itself after the first
/// terminal event. An unknown id yields a single error event, so
/// resubscribing after a disconnect is always safe.
pub async fn job_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = watch_job(state.store.clone(), job_id, state.poll_interval());
    let stream = ReceiverStream::new(rx).map(|update| {
        let event = Event::default()
            .json_data(&update)
            .unwrap_or_else(|_| Event::default().data("{\"error\":\"unserializable event\"}"));
        Ok(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
