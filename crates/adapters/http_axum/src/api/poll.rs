//! On-demand poll handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use avsync_app::engine::PollReport;
use avsync_app::ports::{BindingStore, DeviceProxy, EventSink};
use avsync_domain::id::DeviceId;

use crate::error::ApiError;
use crate::state::AppState;

/// A device that failed during an on-demand poll.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub device: DeviceId,
    pub error: String,
}

/// JSON rendering of a [`PollReport`].
#[derive(Debug, Serialize)]
pub struct ReportBody {
    pub succeeded: Vec<DeviceId>,
    pub failed: Vec<FailureBody>,
}

impl From<PollReport> for ReportBody {
    fn from(report: PollReport) -> Self {
        Self {
            succeeded: report.succeeded,
            failed: report
                .failed
                .into_iter()
                .map(|failure| FailureBody {
                    device: failure.device_id,
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Possible responses from the poll endpoints.
pub enum PollResponse {
    Ok(Json<ReportBody>),
    NoContent,
}

impl IntoResponse for PollResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `POST /api/poll`: run one poll cycle over every device now.
pub async fn all<P, B, S>(State(state): State<AppState<P, B, S>>) -> PollResponse
where
    P: DeviceProxy + 'static,
    B: BindingStore + 'static,
    S: EventSink + 'static,
{
    let report = state.engine.poll_cycle().await;
    PollResponse::Ok(Json(report.into()))
}

/// `POST /api/devices/{device}/poll`: poll a single device now.
pub async fn device<P, B, S>(
    State(state): State<AppState<P, B, S>>,
    Path(device): Path<DeviceId>,
) -> Result<PollResponse, ApiError>
where
    P: DeviceProxy + 'static,
    B: BindingStore + 'static,
    S: EventSink + 'static,
{
    state.engine.poll_device(&device).await?;
    Ok(PollResponse::NoContent)
}
