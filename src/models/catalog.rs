use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

pub const CATALOG_STATUSES: [&str; 2] = ["active", "inactive"];

pub fn check_catalog_status(status: &str) -> Result<(), AppError> {
    if CATALOG_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "status must be one of {}",
            CATALOG_STATUSES.join(", ")
        )))
    }
}

pub fn check_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Color {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub hex_value: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Series {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub brand_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub brand_id: Uuid,
    pub color_id: Option<Uuid>,
    pub series_id: Option<Uuid>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogFilter {
    pub status: Option<String>,
    pub brand_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBrand {
    pub name: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBrand {
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateColor {
    pub name: String,
    pub hex_value: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateColor {
    pub name: Option<String>,
    pub hex_value: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSeries {
    pub name: String,
    pub brand_id: Uuid,
    pub status: Option<String>,
}

// A series never moves to another brand; its products share that brand.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSeries {
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub brand_id: Uuid,
    pub color_id: Option<Uuid>,
    pub series_id: Option<Uuid>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub color_id: Option<Uuid>,
    pub series_id: Option<Uuid>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub status: Option<String>,
}

impl CreateProduct {
    pub fn validate(&self) -> Result<(), AppError> {
        check_name(&self.name)?;
        if let Some(status) = &self.status {
            check_catalog_status(status)?;
        }
        if self.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(AppError::BadRequest("price must not be negative".to_string()));
        }
        Ok(())
    }
}

impl UpdateProduct {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(status) = &self.status {
            check_catalog_status(status)?;
        }
        if self.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(AppError::BadRequest("price must not be negative".to_string()));
        }
        Ok(())
    }
}

/// Validates the optional name/status pair shared by the simpler catalog
/// entities.
pub fn check_fields(name: Option<&str>, status: Option<&str>) -> Result<(), AppError> {
    if let Some(name) = name {
        check_name(name)?;
    }
    if let Some(status) = status {
        check_catalog_status(status)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product(price: Option<&str>, status: Option<&str>) -> CreateProduct {
        CreateProduct {
            name: "Desk lamp".to_string(),
            brand_id: Uuid::new_v4(),
            color_id: None,
            series_id: None,
            description: None,
            price: price.map(|p| Decimal::from_str(p).unwrap()),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn accepts_known_statuses() {
        assert!(check_catalog_status("active").is_ok());
        assert!(check_catalog_status("inactive").is_ok());
        assert!(check_catalog_status("archived").is_err());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(check_fields(Some("   "), None).is_err());
        assert!(check_fields(Some("Acme"), Some("active")).is_ok());
        assert!(check_fields(None, None).is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(product(Some("19.99"), None).validate().is_ok());
        assert!(product(Some("-1.00"), None).validate().is_err());
        assert!(product(None, Some("retired")).validate().is_err());
    }

    #[test]
    fn series_update_cannot_change_brand() {
        let body = format!(r#"{{"name":"Nova","brand_id":"{}"}}"#, Uuid::new_v4());
        assert!(serde_json::from_str::<UpdateSeries>(&body).is_err());

        let form: UpdateSeries = serde_json::from_str(r#"{"name":"Nova"}"#).unwrap();
        assert_eq!(form.name.as_deref(), Some("Nova"));
        assert_eq!(form.status, None);
    }
}
