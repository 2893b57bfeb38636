use chrono::{DateTime, Local, TimeZone};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Document prefixes used by the back office
pub mod prefix {
    pub const REQUISITION: &str = "REQ";
    pub const INCIDENT: &str = "INC";
    pub const MAINTENANCE: &str = "MNT";
    pub const RESPONSIVE_FORM: &str = "FR";
}

/// Generate a document code such as `REQ-250314-042`.
///
/// Layout: `<PREFIX>-<YYMMDD>-<NNN>` where `NNN` is random in `000..=999`.
/// Codes are not guaranteed unique; callers retry on a unique index violation.
pub fn document_code(prefix: &str) -> String {
    document_code_at(prefix, &Local::now())
}

/// [`document_code`] for a fixed instant
pub fn document_code_at<Tz: TimeZone>(prefix: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    use rand::Rng;
    let n: u16 = rand::thread_rng().gen_range(0..1000);
    format!("{}-{}-{:03}", prefix, at.format("%y%m%d"), n)
}

/// Round a money value to cents (half away from zero)
pub fn round_money(value: f64) -> f64 {
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use rust_decimal::{Decimal, RoundingStrategy};

    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Sum money values in decimal arithmetic, rounded to cents
pub fn sum_money(values: impl IntoIterator<Item = f64>) -> f64 {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

    let total: Decimal = values.into_iter().filter_map(Decimal::from_f64).sum();
    total.to_f64().map(round_money).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_document_code_layout() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let code = document_code_at(prefix::REQUISITION, &at);
        assert!(code.starts_with("REQ-250314-"), "{}", code);
        assert_eq!(code.len(), "REQ-250314-000".len());
        let seq: u16 = code[11..].parse().unwrap();
        assert!(seq < 1000);
    }

    #[test]
    fn test_document_code_prefixes() {
        assert!(document_code(prefix::INCIDENT).starts_with("INC-"));
        assert!(document_code(prefix::MAINTENANCE).starts_with("MNT-"));
        assert!(document_code(prefix::RESPONSIVE_FORM).starts_with("FR-"));
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(10.994), 10.99);
        assert_eq!(round_money(0.125), 0.13);
        assert_eq!(round_money(2500.5), 2500.5);
        assert_eq!(round_money(0.0), 0.0);
    }

    #[test]
    fn test_sum_money_avoids_float_drift() {
        assert_eq!(sum_money([0.1, 0.2]), 0.3);
        assert_eq!(sum_money([1500.0, 2500.5, 99.99]), 4100.49);
        assert_eq!(sum_money(Vec::new()), 0.0);
    }
}
