//! Asset Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use crate::utils::time::DateInput;

pub type AssetId = RecordId;

string_enum! {
    /// Asset lifecycle state; `inactive` marks a retired asset
    pub enum AssetStatus {
        Active => "active",
        InUse => "in_use",
        Maintenance => "maintenance",
        Inactive => "inactive",
    }
    default = Active
}

/// Inventory asset
///
/// `category_name` and `responsible_name` are filled by list/get queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AssetId>,
    pub asset_code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename(serialize = "type"))]
    pub asset_type: String,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub category_id: Option<RecordId>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub purchase_date: Option<i64>,
    #[serde(default)]
    pub purchase_price: f64,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: AssetStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub responsible_user_id: Option<RecordId>,
    #[serde(default)]
    pub warranty_expiry: Option<i64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,

    // Populated references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_name: Option<String>,
}

impl Asset {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssetCreate {
    #[validate(length(min = 1, message = "Código de activo es requerido"))]
    pub asset_code: String,
    #[validate(length(min = 1, message = "Nombre es requerido"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub category_id: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<DateInput>,
    #[validate(range(min = 0.0, message = "El precio no puede ser negativo"))]
    pub purchase_price: Option<f64>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub status: Option<AssetStatus>,
    pub responsible_user_id: Option<String>,
    pub warranty_expiry: Option<DateInput>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AssetUpdate {
    #[validate(length(min = 1, message = "Código de activo es requerido"))]
    pub asset_code: Option<String>,
    #[validate(length(min = 1, message = "Nombre es requerido"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub category_id: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<DateInput>,
    #[validate(range(min = 0.0, message = "El precio no puede ser negativo"))]
    pub purchase_price: Option<f64>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub status: Option<AssetStatus>,
    pub responsible_user_id: Option<String>,
    pub warranty_expiry: Option<DateInput>,
    pub notes: Option<String>,
}

/// `GET /api/inventory` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFilter {
    pub category: Option<String>,
    pub status: Option<AssetStatus>,
    /// Case-insensitive match on name, asset_code and brand
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Validated asset fields ready for the repository
#[derive(Debug, Clone, Default)]
pub struct AssetFields {
    pub asset_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub asset_type: Option<String>,
    pub category_id: Option<RecordId>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<i64>,
    pub purchase_price: Option<f64>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub status: Option<AssetStatus>,
    pub responsible_user_id: Option<RecordId>,
    pub warranty_expiry: Option<i64>,
    pub notes: Option<String>,
}
