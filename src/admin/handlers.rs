use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::admin::form::{PolicyForm, PolicySubmission};
use crate::http::server::AppState;
use crate::policy::{HeaderPolicy, PolicyError};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// Admin view of the active policy.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyView {
    pub send_header: bool,
    pub options: String,
    pub directive: &'static str,
    /// The header line responses currently carry, if any.
    pub header: Option<String>,
    pub backend: String,
}

impl PolicyView {
    fn new(policy: &HeaderPolicy, backend: String) -> Self {
        Self {
            send_header: policy.enabled(),
            options: policy.value().to_string(),
            directive: policy.directive().label(),
            header: policy
                .header_for()
                .map(|(name, value)| format!("{}: {}", name, value)),
            backend,
        }
    }
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("policy update task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::Policy(e) if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_policy(State(state): State<AppState>) -> Json<PolicyView> {
    let policy = state.store.current();
    Json(PolicyView::new(&policy, state.store.backend().describe()))
}

pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<PolicyForm>,
) -> Result<Json<PolicyView>, AdminError> {
    let candidate = form.into_candidate()?;
    apply(state, candidate).await
}

pub async fn submit_json(
    State(state): State<AppState>,
    Json(submission): Json<PolicySubmission>,
) -> Result<Json<PolicyView>, AdminError> {
    let candidate = submission.into_candidate()?;
    apply(state, candidate).await
}

async fn apply(state: AppState, candidate: HeaderPolicy) -> Result<Json<PolicyView>, AdminError> {
    let store = state.store.clone();
    let stored = candidate.clone();
    let result = tokio::task::spawn_blocking(move || store.update(stored)).await?;

    if let Err(e) = result {
        tracing::warn!(error = %e, "Header policy submission rejected");
        return Err(e.into());
    }

    Ok(Json(PolicyView::new(&candidate, state.store.backend().describe())))
}
