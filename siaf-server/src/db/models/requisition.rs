//! Requisition Model
//!
//! Cash requisitions. `amount_in_words` always mirrors `amount`.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use super::PdfData;
use crate::utils::time::DateInput;

pub type RequisitionId = RecordId;

string_enum! {
    pub enum RequestType {
        Transferencia => "transferencia",
        PagoTarjeta => "pago_tarjeta",
        Efectivo => "efectivo",
        PagoLinea => "pago_linea",
    }
    default = Transferencia
}

impl RequestType {
    /// Printed document title
    pub fn title(&self) -> String {
        format!("Solicitud de {}", self.as_str().to_uppercase())
    }
}

string_enum! {
    pub enum Currency {
        Mxn => "MXN",
        Usd => "USD",
    }
    default = Mxn
}

string_enum! {
    pub enum RequisitionStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Completed => "completed",
    }
    default = Pending
}

impl RequisitionStatus {
    pub fn is_deletable(&self) -> bool {
        matches!(self, RequisitionStatus::Pending | RequisitionStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requisition {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RequisitionId>,
    pub requisition_code: String,
    pub request_type: RequestType,
    pub amount: f64,
    #[serde(default)]
    pub currency: Currency,
    pub amount_in_words: String,
    pub payable_to: String,
    pub concept: String,
    pub request_date: i64,
    #[serde(default)]
    pub department: String,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub requested_by: Option<RecordId>,
    #[serde(default)]
    pub status: RequisitionStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub approved_by: Option<RecordId>,
    #[serde(default)]
    pub approval_date: Option<i64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,

    // Populated references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequisitionCreate {
    pub request_type: RequestType,
    #[validate(range(min = 0.0, message = "El monto no puede ser negativo"))]
    #[serde(deserialize_with = "serde_helpers::numeric::deserialize")]
    pub amount: f64,
    pub currency: Option<Currency>,
    #[validate(length(min = 1, message = "Beneficiario es requerido"))]
    pub payable_to: String,
    #[validate(length(min = 1, message = "Concepto es requerido"))]
    pub concept: String,
    pub request_date: Option<DateInput>,
    pub department: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RequisitionUpdate {
    pub request_type: Option<RequestType>,
    #[validate(range(min = 0.0, message = "El monto no puede ser negativo"))]
    #[serde(default, deserialize_with = "serde_helpers::option_numeric::deserialize")]
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    #[validate(length(min = 1, message = "Beneficiario es requerido"))]
    pub payable_to: Option<String>,
    #[validate(length(min = 1, message = "Concepto es requerido"))]
    pub concept: Option<String>,
    pub request_date: Option<DateInput>,
    pub department: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequisitionFilter {
    pub status: Option<RequisitionStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Validated requisition fields ready for the repository
///
/// `amount` and `amount_in_words` always travel together.
#[derive(Debug, Clone, Default)]
pub struct RequisitionFields {
    pub request_type: Option<RequestType>,
    pub amount: Option<(f64, String)>,
    pub currency: Option<Currency>,
    pub payable_to: Option<String>,
    pub concept: Option<String>,
    pub request_date: Option<i64>,
    pub department: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequisitionPdf {
    pub requisition: Requisition,
    pub pdf_data: PdfData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_type_wire_names() {
        let t: RequestType = serde_json::from_str(r#""pago_tarjeta""#).unwrap();
        assert_eq!(t, RequestType::PagoTarjeta);
        assert_eq!(t.title(), "Solicitud de PAGO_TARJETA");
        assert!(serde_json::from_str::<RequestType>(r#""cheque""#).is_err());
    }

    #[test]
    fn test_currency_defaults_to_pesos() {
        assert_eq!(Currency::default(), Currency::Mxn);
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), r#""USD""#);
    }

    #[test]
    fn test_only_pending_or_rejected_are_deletable() {
        assert!(RequisitionStatus::Pending.is_deletable());
        assert!(RequisitionStatus::Rejected.is_deletable());
        assert!(!RequisitionStatus::Approved.is_deletable());
        assert!(!RequisitionStatus::Completed.is_deletable());
    }

    #[test]
    fn test_all_lists_every_status() {
        let names: Vec<_> = RequisitionStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, ["pending", "approved", "rejected", "completed"]);
    }
}
