//! Asset Category Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

pub type CategoryId = RecordId;

/// Categories seeded on first run
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Computadora", "Equipos de cómputo y laptops"),
    ("Impresora", "Impresoras y escáneres"),
    ("Cámara", "Cámaras de seguridad"),
    ("Red", "Equipos de red"),
    ("Software", "Licencias de software"),
    ("Otro", "Otros activos"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCategory {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default = "serde_helpers::default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub active: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssetCategoryCreate {
    #[validate(length(min = 1, message = "Nombre es requerido"))]
    pub name: String,
    pub description: Option<String>,
}
