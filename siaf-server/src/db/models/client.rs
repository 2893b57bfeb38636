//! Client Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub rfc: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
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
pub struct ClientCreate {
    #[validate(length(min = 1, message = "Nombre es requerido"))]
    pub name: String,
    #[validate(length(max = 13, message = "RFC inválido"))]
    pub rfc: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
