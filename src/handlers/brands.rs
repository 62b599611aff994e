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
    models::{catalog::check_fields, Brand, CreateBrand, StatusFilter, UpdateBrand},
    sequence::format::kinds,
    state::AppState,
};

pub async fn list_brands(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<Brand>>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_READ)?;

    let brands = sqlx::query_as::<_, Brand>(
        "SELECT * FROM brands WHERE ($1::text IS NULL OR status = $1) ORDER BY code",
    )
    .bind(filter.status)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(brands))
}

pub async fn get_brand(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Brand>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_READ)?;

    let brand = sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("brand"))?;

    Ok(Json(brand))
}

pub async fn create_brand(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<CreateBrand>,
) -> Result<(StatusCode, Json<Brand>), AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(CATALOG_WRITE)?;
    check_fields(Some(&form.name), form.status.as_deref())?;

    let code = state.sequences.allocate(kinds::BRAND).await?;

    let brand = sqlx::query_as::<_, Brand>(
        r#"
        INSERT INTO brands (code, name, status)
        VALUES ($1, $2, COALESCE($3, 'active'))
        RETURNING *
        "#,
    )
    .bind(&code)
    .bind(form.name.trim())
    .bind(&form.status)
    .fetch_one(&state.db)
    .await?;

    info!("{} created brand {} ({})", user.subject, brand.code, brand.name);
    Ok((StatusCode::CREATED, Json(brand)))
}

pub async fn update_brand(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateBrand>,
) -> Result<Json<Brand>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_WRITE)?;
    check_fields(form.name.as_deref(), form.status.as_deref())?;

    let brand = sqlx::query_as::<_, Brand>(
        r#"
        UPDATE brands
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
    .ok_or(AppError::NotFound("brand"))?;

    Ok(Json(brand))
}

// The brand's code is retired with it; the counter never goes back.
pub async fn delete_brand(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(CATALOG_DELETE)?;

    let code = sqlx::query_scalar::<_, String>("DELETE FROM brands WHERE id = $1 RETURNING code")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("brand"))?;

    info!("{} deleted brand {}", user.subject, code);
    Ok(StatusCode::NO_CONTENT)
}
