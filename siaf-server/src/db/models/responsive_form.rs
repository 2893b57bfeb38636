//! Responsive Form Model
//!
//! Custody transfer of an asset from one responsible user to another.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use crate::utils::time::DateInput;

pub type ResponsiveFormId = RecordId;

string_enum! {
    pub enum FormStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
    default = Pending
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsiveForm {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ResponsiveFormId>,
    pub form_code: String,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub asset_id: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub previous_responsible_id: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub new_responsible_id: Option<RecordId>,
    pub transfer_date: i64,
    pub reason: String,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub status: FormStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub approved_by: Option<RecordId>,
    #[serde(default)]
    pub approval_date: Option<i64>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,

    // Populated references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_responsible_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_responsible_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResponsiveFormCreate {
    pub asset_id: String,
    pub new_responsible_id: String,
    pub transfer_date: Option<DateInput>,
    #[validate(length(min = 1, message = "Motivo es requerido"))]
    pub reason: String,
    pub conditions: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsiveFormFilter {
    pub status: Option<FormStatus>,
    pub asset_id: Option<String>,
    pub new_responsible_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Printable form data; the client renders the PDF
#[derive(Debug, Clone, Serialize)]
pub struct ResponsiveFormPdf {
    pub form: ResponsiveForm,
    pub pdf_data: PdfData,
}

/// Header data shared by every printable document
#[derive(Debug, Clone, Serialize)]
pub struct PdfData {
    pub title: String,
    pub hotel: String,
    pub date: String,
}
