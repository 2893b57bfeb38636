//! Request payload validation (validator crate → AppError)

use validator::{Validate, ValidationErrors};

use super::{AppError, AppResult};

/// Validate a payload, turning every field error into `details.<field>`
pub fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(validation_error)
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let mut err = AppError::validation("Validation failed");
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some((field, _)) = fields.first() {
        err.message = format!("Invalid field: {}", field);
    }
    for (field, field_errors) in fields {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        err = err.with_detail(field.to_string(), messages);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "Concepto es requerido"))]
        concept: String,
        #[validate(range(min = 0.0))]
        amount: f64,
    }

    #[test]
    fn test_valid_payload() {
        let p = Payload {
            concept: "Compra".into(),
            amount: 10.0,
        };
        assert!(validate_payload(&p).is_ok());
    }

    #[test]
    fn test_field_errors_become_details() {
        let p = Payload {
            concept: String::new(),
            amount: -1.0,
        };
        let err = validate_payload(&p).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details["concept"][0], "Concepto es requerido");
        assert_eq!(details["amount"][0], "range");
        assert_eq!(err.message, "Invalid field: amount");
    }
}
