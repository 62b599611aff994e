use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use log::info;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::{get_current_user, permission::{CATALOG_DELETE, CATALOG_READ, CATALOG_WRITE}},
    models::{catalog::check_fields, CreateSeries, CatalogFilter, Series, UpdateSeries},
    sequence::format::kinds,
    state::AppState,
};

pub async fn list_series(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<CatalogFilter>,
) -> Result<Json<Vec<Series>>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_READ)?;

    let series = sqlx::query_as::<_, Series>(
        r#"
        SELECT * FROM series
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::uuid IS NULL OR brand_id = $2)
        ORDER BY code
        "#,
    )
    .bind(filter.status)
    .bind(filter.brand_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(series))
}

pub async fn get_series(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Series>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_READ)?;

    let series = sqlx::query_as::<_, Series>("SELECT * FROM series WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("series"))?;

    Ok(Json(series))
}

pub async fn create_series(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<CreateSeries>,
) -> Result<(StatusCode, Json<Series>), AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(CATALOG_WRITE)?;
    check_fields(Some(&form.name), form.status.as_deref())?;

    let brand_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM brands WHERE id = $1)")
        .bind(form.brand_id)
        .fetch_one(&state.db)
        .await?;
    if !brand_exists {
        return Err(AppError::BadRequest(format!("brand {} does not exist", form.brand_id)));
    }

    let code = state.sequences.allocate(kinds::SERIES).await?;

    let series = sqlx::query_as::<_, Series>(
        r#"
        INSERT INTO series (code, name, brand_id, status)
        VALUES ($1, $2, $3, COALESCE($4, 'active'))
        RETURNING *
        "#,
    )
    .bind(&code)
    .bind(form.name.trim())
    .bind(form.brand_id)
    .bind(&form.status)
    .fetch_one(&state.db)
    .await?;

    info!("{} created series {} ({})", user.subject, series.code, series.name);
    Ok((StatusCode::CREATED, Json(series)))
}

pub async fn update_series(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateSeries>,
) -> Result<Json<Series>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_WRITE)?;
    check_fields(form.name.as_deref(), form.status.as_deref())?;

    let series = sqlx::query_as::<_, Series>(
        r#"
        UPDATE series
        SET name = COALESCE($2, name),
            status = COALESCE($3, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(form.name.as_deref().map(str::trim))
    .bind(&form.status)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("series"))?;

    Ok(Json(series))
}

pub async fn delete_series(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(CATALOG_DELETE)?;

    let code = sqlx::query_scalar::<_, String>("DELETE FROM series WHERE id = $1 RETURNING code")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("series"))?;

    info!("{} deleted series {}", user.subject, code);
    Ok(StatusCode::NO_CONTENT)
}
