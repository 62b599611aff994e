use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::{get_current_user, permission::{PURCHASING_READ, PURCHASING_WRITE}},
    models::{
        purchasing::check_request_status, BulkStatusChange, CreatePurchaseRequest,
        PurchaseRequest, PurchaseRequestFilter, StatusChange,
    },
    sequence::format::kinds,
    state::AppState,
};

#[derive(Serialize)]
pub struct BulkStatusResult {
    pub from: String,
    pub to: String,
    pub updated: u64,
}

pub async fn list_purchase_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<PurchaseRequestFilter>,
) -> Result<Json<Vec<PurchaseRequest>>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(PURCHASING_READ)?;

    let requests = sqlx::query_as::<_, PurchaseRequest>(
        r#"
        SELECT * FROM purchase_requests
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::uuid IS NULL OR product_id = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filter.status)
    .bind(filter.product_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(requests))
}

pub async fn get_purchase_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseRequest>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(PURCHASING_READ)?;

    let request = sqlx::query_as::<_, PurchaseRequest>("SELECT * FROM purchase_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("purchase request"))?;

    Ok(Json(request))
}

pub async fn create_purchase_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseRequest>), AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(PURCHASING_WRITE)?;
    form.validate()?;

    let product_status = sqlx::query_scalar::<_, String>("SELECT status FROM products WHERE id = $1")
        .bind(form.product_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("product {} does not exist", form.product_id)))?;
    if product_status != "active" {
        return Err(AppError::BadRequest(format!(
            "product {} is inactive",
            form.product_id
        )));
    }

    let code = state.sequences.allocate(kinds::PURCHASE_REQUEST).await?;

    let request = sqlx::query_as::<_, PurchaseRequest>(
        r#"
        INSERT INTO purchase_requests (code, product_id, quantity, notes, requested_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&code)
    .bind(form.product_id)
    .bind(form.quantity)
    .bind(&form.notes)
    .bind(&user.subject)
    .fetch_one(&state.db)
    .await?;

    info!(
        "{} raised purchase request {} for {} unit(s)",
        user.subject, request.code, request.quantity
    );
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn update_purchase_request_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> Result<Json<PurchaseRequest>, AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(PURCHASING_WRITE)?;
    check_request_status(&change.status)?;

    let request = sqlx::query_as::<_, PurchaseRequest>(
        r#"
        UPDATE purchase_requests
        SET status = $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&change.status)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("purchase request"))?;

    info!("{} set {} to {}", user.subject, request.code, request.status);
    Ok(Json(request))
}

pub async fn migrate_purchase_request_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(change): Json<BulkStatusChange>,
) -> Result<Json<BulkStatusResult>, AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(PURCHASING_WRITE)?;
    change.validate()?;

    let result = sqlx::query(
        "UPDATE purchase_requests SET status = $2, updated_at = NOW() WHERE status = $1",
    )
    .bind(&change.from)
    .bind(&change.to)
    .execute(&state.db)
    .await?;

    info!(
        "{} moved {} purchase request(s) from {} to {}",
        user.subject,
        result.rows_affected(),
        change.from,
        change.to
    );
    Ok(Json(BulkStatusResult {
        from: change.from,
        to: change.to,
        updated: result.rows_affected(),
    }))
}

pub async fn delete_purchase_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(PURCHASING_WRITE)?;

    let code = sqlx::query_scalar::<_, String>(
        "DELETE FROM purchase_requests WHERE id = $1 RETURNING code",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("purchase request"))?;

    info!("{} deleted purchase request {}", user.subject, code);
    Ok(StatusCode::NO_CONTENT)
}
