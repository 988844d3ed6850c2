//! `GET /api/stats` 接口。

use super::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use common_models::api_payloads::HubStatsPayload;
use log::warn;
use std::time::Duration;
use tokio::time::timeout;

/// 统计查询排在广播之后处理，广播积压时最多等待这么久
pub(crate) const STATS_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn hub_stats(State(state): State<AppState>) -> Result<Json<HubStatsPayload>, ApiError> {
    let connected_clients = match timeout(STATS_TIMEOUT, state.hub.client_count()).await {
        Ok(Ok(count)) => count,
        Ok(Err(_)) => return Err(ApiError::HubUnavailable),
        Err(_) => {
            warn!("[API] /api/stats 等待中枢回复超时 ({:?})", STATS_TIMEOUT);
            return Err(ApiError::HubUnavailable);
        }
    };
    Ok(Json(HubStatsPayload { connected_clients }))
}
