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
    models::{catalog::check_fields, Color, CreateColor, StatusFilter, UpdateColor},
    sequence::format::kinds,
    state::AppState,
};

// Accepts `#rgb` or `#rrggbb`.
fn check_hex_value(hex: Option<&str>) -> Result<(), AppError> {
    let Some(hex) = hex else {
        return Ok(());
    };
    let valid = hex
        .strip_prefix('#')
        .is_some_and(|digits| {
            matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        });
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("{:?} is not a hex color", hex)))
    }
}

pub async fn list_colors(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<Color>>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_READ)?;

    let colors = sqlx::query_as::<_, Color>(
        "SELECT * FROM colors WHERE ($1::text IS NULL OR status = $1) ORDER BY code",
    )
    .bind(filter.status)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(colors))
}

pub async fn get_color(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Color>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_READ)?;

    let color = sqlx::query_as::<_, Color>("SELECT * FROM colors WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("color"))?;

    Ok(Json(color))
}

pub async fn create_color(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<CreateColor>,
) -> Result<(StatusCode, Json<Color>), AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(CATALOG_WRITE)?;
    check_fields(Some(&form.name), form.status.as_deref())?;
    check_hex_value(form.hex_value.as_deref())?;

    let code = state.sequences.allocate(kinds::COLOR).await?;

    let color = sqlx::query_as::<_, Color>(
        r#"
        INSERT INTO colors (code, name, hex_value, status)
        VALUES ($1, $2, $3, COALESCE($4, 'active'))
        RETURNING *
        "#,
    )
    .bind(&code)
    .bind(form.name.trim())
    .bind(&form.hex_value)
    .bind(&form.status)
    .fetch_one(&state.db)
    .await?;

    info!("{} created color {} ({})", user.subject, color.code, color.name);
    Ok((StatusCode::CREATED, Json(color)))
}

pub async fn update_color(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateColor>,
) -> Result<Json<Color>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_WRITE)?;
    check_fields(form.name.as_deref(), form.status.as_deref())?;
    check_hex_value(form.hex_value.as_deref())?;

    let color = sqlx::query_as::<_, Color>(
        r#"
        UPDATE colors
        SET name = COALESCE($2, name),
            hex_value = COALESCE($3, hex_value),
            status = COALESCE($4, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(form.name.as_deref().map(str::trim))
    .bind(&form.hex_value)
    .bind(&form.status)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("color"))?;

    Ok(Json(color))
}

pub async fn delete_color(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(CATALOG_DELETE)?;

    let code = sqlx::query_scalar::<_, String>("DELETE FROM colors WHERE id = $1 RETURNING code")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("color"))?;

    info!("{} deleted color {}", user.subject, code);
    Ok(StatusCode::NO_CONTENT)
}
