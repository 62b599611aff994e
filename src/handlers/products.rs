use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use log::info;
use uuid::Uuid;

use crate::{
    database::Database,
    error::AppError,
    middleware::{get_current_user, permission::{CATALOG_DELETE, CATALOG_READ, CATALOG_WRITE}},
    models::{CatalogFilter, CreateProduct, Product, UpdateProduct},
    sequence::format::kinds,
    state::AppState,
};

// A series has to belong to the product's brand.
async fn check_series_brand(db: &Database, series_id: Uuid, brand_id: Uuid) -> Result<(), AppError> {
    let series_brand = sqlx::query_scalar::<_, Uuid>("SELECT brand_id FROM series WHERE id = $1")
        .bind(series_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("series {} does not exist", series_id)))?;

    if series_brand != brand_id {
        return Err(AppError::BadRequest(format!(
            "series {} belongs to a different brand",
            series_id
        )));
    }
    Ok(())
}

pub async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<CatalogFilter>,
) -> Result<Json<Vec<Product>>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_READ)?;

    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::uuid IS NULL OR brand_id = $2)
        ORDER BY code
        "#,
    )
    .bind(filter.status)
    .bind(filter.brand_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_READ)?;

    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("product"))?;

    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(CATALOG_WRITE)?;
    form.validate()?;
    if let Some(series_id) = form.series_id {
        check_series_brand(&state.db, series_id, form.brand_id).await?;
    }

    let code = state.sequences.allocate(kinds::PRODUCT).await?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (code, name, brand_id, color_id, series_id, description, price, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'active'))
        RETURNING *
        "#,
    )
    .bind(&code)
    .bind(form.name.trim())
    .bind(form.brand_id)
    .bind(form.color_id)
    .bind(form.series_id)
    .bind(&form.description)
    .bind(form.price)
    .bind(&form.status)
    .fetch_one(&state.db)
    .await?;

    info!("{} created product {} ({})", user.subject, product.code, product.name);
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateProduct>,
) -> Result<Json<Product>, AppError> {
    get_current_user(&headers, &state.jwt_secret)?.require(CATALOG_WRITE)?;
    form.validate()?;

    if let Some(series_id) = form.series_id {
        let brand_id = sqlx::query_scalar::<_, Uuid>("SELECT brand_id FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::NotFound("product"))?;
        check_series_brand(&state.db, series_id, brand_id).await?;
    }

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = COALESCE($2, name),
            color_id = COALESCE($3, color_id),
            series_id = COALESCE($4, series_id),
            description = COALESCE($5, description),
            price = COALESCE($6, price),
            status = COALESCE($7, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(form.name.as_deref().map(str::trim))
    .bind(form.color_id)
    .bind(form.series_id)
    .bind(&form.description)
    .bind(form.price)
    .bind(&form.status)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("product"))?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = get_current_user(&headers, &state.jwt_secret)?;
    user.require(CATALOG_DELETE)?;

    let code = sqlx::query_scalar::<_, String>("DELETE FROM products WHERE id = $1 RETURNING code")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("product"))?;

    info!("{} deleted product {}", user.subject, code);
    Ok(StatusCode::NO_CONTENT)
}
