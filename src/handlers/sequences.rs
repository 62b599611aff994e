use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use log::error;

use crate::{
    error::AppError,
    middleware::{get_current_user, permission::SEQUENCES_READ},
    models::SequenceCounterView,
    sequence::CounterStore,
    state::AppState,
};

// Read-only: listing never creates or advances a counter.
pub async fn list_sequences(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<SequenceCounterView>>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(SEQUENCES_READ)?;

    let counters = state.sequences.store().list().await?;
    let registry = state.sequences.registry();

    Ok(Json(
        counters
            .into_iter()
            .map(|counter| {
                let configured = registry.get(&counter.entity_kind);
                SequenceCounterView::new(counter, configured)
            })
            .collect(),
    ))
}

pub async fn health(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            error!("Health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
