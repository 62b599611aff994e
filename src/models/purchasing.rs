use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

pub const REQUEST_STATUSES: [&str; 4] = ["pending", "approved", "rejected", "ordered"];

pub fn check_request_status(status: &str) -> Result<(), AppError> {
    if REQUEST_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "status must be one of {}",
            REQUEST_STATUSES.join(", ")
        )))
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PurchaseRequest {
    pub id: Uuid,
    pub code: String,
    pub product_id: Uuid,
    pub quantity: i32,
    pub status: String,
    pub notes: Option<String>,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequestFilter {
    pub status: Option<String>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
}

impl CreatePurchaseRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.quantity <= 0 {
            return Err(AppError::BadRequest("quantity must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

/// Moves every request in `from` to `to`.
#[derive(Debug, Deserialize)]
pub struct BulkStatusChange {
    pub from: String,
    pub to: String,
}

impl BulkStatusChange {
    pub fn validate(&self) -> Result<(), AppError> {
        check_request_status(&self.from)?;
        check_request_status(&self.to)?;
        if self.from == self.to {
            return Err(AppError::BadRequest("from and to must differ".to_string()));
        }
        Ok(())
    }
}
