use autostep_core::human::PendingConfirmation;
use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/human: the confirmation a script is waiting for, or `null`.
pub async fn get_pending(State(app): State<AppState>) -> Json<Option<PendingConfirmation>> {
    Json(app.orchestrator.gate().pending())
}

/// POST /api/human/continue: acknowledge the pending confirmation.
pub async fn continue_script(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let pending = app.orchestrator.gate().pending();
    if !app.orchestrator.gate().acknowledge() {
        return Err(AppError::conflict("no confirmation is pending"));
    }
    tracing::info!("operator acknowledged confirmation");
    Ok(Json(serde_json::json!({
        "acknowledged": true,
        "confirmation": pending,
    })))
}
