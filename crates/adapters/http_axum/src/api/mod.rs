//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod items;
#[allow(clippy::missing_errors_doc)]
pub mod poll;

use axum::Router;
use axum::routing::post;

use avsync_app::ports::{BindingStore, DeviceProxy, EventSink};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<P, B, S>() -> Router<AppState<P, B, S>>
where
    P: DeviceProxy + 'static,
    B: BindingStore + 'static,
    S: EventSink + 'static,
{
    Router::new()
        // Commands
        .route("/items/{item}", post(items::send_text::<P, B, S>))
        .route("/items/{item}/command", post(items::send_json::<P, B, S>))
        // Polling
        .route("/poll", post(poll::all::<P, B, S>))
        .route("/devices/{device}/poll", post(poll::device::<P, B, S>))
}
