//! Scanner station endpoint.

use axum::{extract::State, Json};
use domain::models::{ScanRequest, ScanResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{Operator, ValidatedJson};
use crate::services::redeem;

/// POST /api/v1/scans
///
/// Redeems a scanned payload. `success`, `used` and `invalid` are all 200
/// responses; only store and configuration failures are errors.
pub async fn scan_ticket(
    State(state): State<AppState>,
    operator: Operator,
    ValidatedJson(request): ValidatedJson<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let store = state.tickets()?;
    let response = redeem(store, &request.payload, operator.actor()).await?;
    Ok(Json(response))
}
