//! Importe con letra (Mexican peso amount-to-words)
//!
//! Renders a monetary amount the way it is printed on a requisition or a cheque:
//!
//! ```text
//! 2500.50  → "DOS MIL QUINIENTOS 50/100 MN"
//! 21       → "VEINTIUNO 00/100 MN"
//! 21000    → "VEINTIÚN MIL 00/100 MN"
//! 1000000  → "UN MILLÓN 00/100 MN"
//! ```
//!
//! # Rules
//!
//! - The amount is rounded to cents (half away from zero) before rendering, so
//!   `10.999` reads `ONCE 00/100 MN`.
//! - Each tier (units, thousands, millions) is rendered from the lookup tables
//!   below. A group equal to 100 is always `CIEN`.
//! - A group in front of `MIL` / `MILLONES` takes the short form of one
//!   (`UN`, `VEINTIÚN`, `TREINTA Y UN`).
//! - Amounts of one *billón* (10^12) and above have no name in this grammar and
//!   are rejected, as are negative and non-finite amounts.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// First amount that can no longer be written (one *billón*).
pub const MAX_AMOUNT_EXCLUSIVE: u64 = 1_000_000_000_000;

/// Suffix appended after the cents, "moneda nacional".
pub const CURRENCY_SUFFIX: &str = "/100 MN";

const UNITS: [&str; 10] = [
    "", "UNO", "DOS", "TRES", "CUATRO", "CINCO", "SEIS", "SIETE", "OCHO", "NUEVE",
];

const TEENS: [&str; 10] = [
    "DIEZ",
    "ONCE",
    "DOCE",
    "TRECE",
    "CATORCE",
    "QUINCE",
    "DIECISÉIS",
    "DIECISIETE",
    "DIECIOCHO",
    "DIECINUEVE",
];

const TWENTIES: [&str; 10] = [
    "VEINTE",
    "VEINTIUNO",
    "VEINTIDÓS",
    "VEINTITRÉS",
    "VEINTICUATRO",
    "VEINTICINCO",
    "VEINTISÉIS",
    "VEINTISIETE",
    "VEINTIOCHO",
    "VEINTINUEVE",
];

/// Indexed by the tens digit; 0..=2 are covered by the tables above.
const TENS: [&str; 10] = [
    "",
    "",
    "",
    "TREINTA",
    "CUARENTA",
    "CINCUENTA",
    "SESENTA",
    "SETENTA",
    "OCHENTA",
    "NOVENTA",
];

const HUNDREDS: [&str; 10] = [
    "",
    "CIENTO",
    "DOSCIENTOS",
    "TRESCIENTOS",
    "CUATROCIENTOS",
    "QUINIENTOS",
    "SEISCIENTOS",
    "SETECIENTOS",
    "OCHOCIENTOS",
    "NOVECIENTOS",
];

/// Why an amount cannot be written in words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidAmount {
    #[error("amount must not be negative")]
    Negative,
    #[error("amount must be a finite number")]
    NotFinite,
    #[error("amount must be less than 1,000,000,000,000")]
    TooLarge,
}

/// How a trailing "one" is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    /// Last word of the number: `UNO`, `VEINTIUNO`
    Final,
    /// Multiplier before `MIL` / `MILLONES`: `UN`, `VEINTIÚN`
    Short,
}

fn unit(digit: usize, form: Form) -> &'static str {
    if digit == 1 && form == Form::Short {
        "UN"
    } else {
        UNITS[digit]
    }
}

/// 1..=99
fn push_tens(n: u64, form: Form, out: &mut Vec<&'static str>) {
    let tens = (n / 10) as usize;
    let digit = (n % 10) as usize;
    match tens {
        0 => out.push(unit(digit, form)),
        1 => out.push(TEENS[digit]),
        2 if digit == 1 && form == Form::Short => out.push("VEINTIÚN"),
        2 => out.push(TWENTIES[digit]),
        _ => {
            out.push(TENS[tens]);
            if digit > 0 {
                out.push("Y");
                out.push(unit(digit, form));
            }
        }
    }
}

/// 1..=999
fn push_hundreds(n: u64, form: Form, out: &mut Vec<&'static str>) {
    if n == 100 {
        out.push("CIEN");
        return;
    }
    let hundreds = (n / 100) as usize;
    if hundreds > 0 {
        out.push(HUNDREDS[hundreds]);
    }
    let rest = n % 100;
    if rest > 0 {
        push_tens(rest, form, out);
    }
}

/// 1..=999_999
fn push_thousands(n: u64, form: Form, out: &mut Vec<&'static str>) {
    let thousands = n / 1000;
    match thousands {
        0 => {}
        1 => out.push("MIL"),
        _ => {
            push_hundreds(thousands, Form::Short, out);
            out.push("MIL");
        }
    }
    let rest = n % 1000;
    if rest > 0 {
        push_hundreds(rest, form, out);
    }
}

/// Write a whole number in words (no cents suffix).
///
/// `0` is `CERO`.
pub fn integer_to_words(n: u64) -> Result<String, InvalidAmount> {
    if n >= MAX_AMOUNT_EXCLUSIVE {
        return Err(InvalidAmount::TooLarge);
    }
    if n == 0 {
        return Ok("CERO".to_string());
    }

    let mut words = Vec::with_capacity(16);
    let millions = n / 1_000_000;
    match millions {
        0 => {}
        1 => words.extend(["UN", "MILLÓN"]),
        _ => {
            push_thousands(millions, Form::Short, &mut words);
            words.push("MILLONES");
        }
    }
    let rest = n % 1_000_000;
    if rest > 0 {
        push_thousands(rest, Form::Final, &mut words);
    }

    Ok(words.join(" "))
}

/// Write a monetary amount as `"<WORDS> <CC>/100 MN"`.
pub fn amount_to_words(amount: Decimal) -> Result<String, InvalidAmount> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(InvalidAmount::Negative);
    }

    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let integer = rounded.trunc();
    let cents = ((rounded - integer) * Decimal::ONE_HUNDRED)
        .to_u64()
        .ok_or(InvalidAmount::TooLarge)?;
    let integer = integer.to_u64().ok_or(InvalidAmount::TooLarge)?;

    let words = integer_to_words(integer)?;
    Ok(format!("{} {:02}{}", words, cents, CURRENCY_SUFFIX))
}

/// [`amount_to_words`] for amounts that arrive as JSON numbers.
pub fn amount_to_words_f64(amount: f64) -> Result<String, InvalidAmount> {
    if !amount.is_finite() {
        return Err(InvalidAmount::NotFinite);
    }
    if amount < 0.0 {
        return Err(InvalidAmount::Negative);
    }
    let value = Decimal::from_f64(amount).ok_or(InvalidAmount::TooLarge)?;
    amount_to_words(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn words(amount: &str) -> String {
        amount_to_words(Decimal::from_str(amount).expect("decimal literal")).expect("valid amount")
    }

    fn int(n: u64) -> String {
        integer_to_words(n).expect("in range")
    }

    #[test]
    fn test_zero() {
        assert_eq!(words("0"), "CERO 00/100 MN");
        assert_eq!(words("0.00"), "CERO 00/100 MN");
        assert_eq!(words("0.05"), "CERO 05/100 MN");
    }

    #[test]
    fn test_cien_is_irregular() {
        assert_eq!(words("100"), "CIEN 00/100 MN");
        assert_eq!(int(101), "CIENTO UNO");
        assert_eq!(int(199), "CIENTO NOVENTA Y NUEVE");
    }

    #[test]
    fn test_units() {
        assert_eq!(int(1), "UNO");
        assert_eq!(int(5), "CINCO");
        assert_eq!(int(9), "NUEVE");
    }

    #[test]
    fn test_teens() {
        let expected = [
            "DIEZ",
            "ONCE",
            "DOCE",
            "TRECE",
            "CATORCE",
            "QUINCE",
            "DIECISÉIS",
            "DIECISIETE",
            "DIECIOCHO",
            "DIECINUEVE",
        ];
        for (i, word) in expected.iter().enumerate() {
            assert_eq!(int(10 + i as u64), *word);
        }
        assert_eq!(words("15"), "QUINCE 00/100 MN");
    }

    #[test]
    fn test_twenties_are_fused() {
        assert_eq!(int(20), "VEINTE");
        assert_eq!(words("21"), "VEINTIUNO 00/100 MN");
        assert_eq!(int(22), "VEINTIDÓS");
        assert_eq!(int(23), "VEINTITRÉS");
        assert_eq!(int(26), "VEINTISÉIS");
        assert_eq!(int(29), "VEINTINUEVE");
    }

    #[test]
    fn test_tens_with_y() {
        assert_eq!(int(30), "TREINTA");
        assert_eq!(int(31), "TREINTA Y UNO");
        assert_eq!(int(32), "TREINTA Y DOS");
        assert_eq!(int(47), "CUARENTA Y SIETE");
        assert_eq!(int(90), "NOVENTA");
        assert_eq!(int(99), "NOVENTA Y NUEVE");
    }

    #[test]
    fn test_hundreds() {
        assert_eq!(int(200), "DOSCIENTOS");
        assert_eq!(int(305), "TRESCIENTOS CINCO");
        assert_eq!(int(415), "CUATROCIENTOS QUINCE");
        assert_eq!(int(500), "QUINIENTOS");
        assert_eq!(int(621), "SEISCIENTOS VEINTIUNO");
        assert_eq!(int(777), "SETECIENTOS SETENTA Y SIETE");
        assert_eq!(int(999), "NOVECIENTOS NOVENTA Y NUEVE");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(words("1000"), "MIL 00/100 MN");
        assert_eq!(int(1001), "MIL UNO");
        assert_eq!(int(1100), "MIL CIEN");
        assert_eq!(int(2000), "DOS MIL");
        assert_eq!(words("2500.50"), "DOS MIL QUINIENTOS 50/100 MN");
        assert_eq!(int(15_300), "QUINCE MIL TRESCIENTOS");
        assert_eq!(int(100_000), "CIEN MIL");
        assert_eq!(int(101_000), "CIENTO UN MIL");
        assert_eq!(int(999_999), "NOVECIENTOS NOVENTA Y NUEVE MIL NOVECIENTOS NOVENTA Y NUEVE");
    }

    #[test]
    fn test_short_one_before_mil() {
        assert_eq!(int(21_000), "VEINTIÚN MIL");
        assert_eq!(int(31_000), "TREINTA Y UN MIL");
        assert_eq!(int(21_021), "VEINTIÚN MIL VEINTIUNO");
        assert_eq!(int(121_001), "CIENTO VEINTIÚN MIL UNO");
    }

    #[test]
    fn test_millions() {
        assert_eq!(words("1000000"), "UN MILLÓN 00/100 MN");
        assert_eq!(int(1_000_001), "UN MILLÓN UNO");
        assert!(words("2000000").starts_with("DOS MILLONES"));
        assert_eq!(int(2_000_000), "DOS MILLONES");
        assert_eq!(int(21_000_000), "VEINTIÚN MILLONES");
        assert_eq!(int(100_000_000), "CIEN MILLONES");
        assert_eq!(
            int(1_234_567),
            "UN MILLÓN DOSCIENTOS TREINTA Y CUATRO MIL QUINIENTOS SESENTA Y SIETE"
        );
        assert_eq!(
            int(999_999_999),
            "NOVECIENTOS NOVENTA Y NUEVE MILLONES NOVECIENTOS NOVENTA Y NUEVE MIL NOVECIENTOS NOVENTA Y NUEVE"
        );
    }

    #[test]
    fn test_thousands_of_millions() {
        assert_eq!(int(1_000_000_000), "MIL MILLONES");
        assert_eq!(int(2_500_000_000), "DOS MIL QUINIENTOS MILLONES");
        assert_eq!(int(21_000_000_000), "VEINTIÚN MIL MILLONES");
        assert_eq!(int(1_001_000_000), "MIL UN MILLONES");
    }

    #[test]
    fn test_cents_are_rounded_half_up() {
        assert_eq!(words("10.994"), "DIEZ 99/100 MN");
        assert_eq!(words("10.995"), "ONCE 00/100 MN");
        assert_eq!(words("10.999"), "ONCE 00/100 MN");
        assert_eq!(words("0.5"), "CERO 50/100 MN");
        assert_eq!(words("99.999"), "CIEN 00/100 MN");
        assert_eq!(words("1234.07"), "MIL DOSCIENTOS TREINTA Y CUATRO 07/100 MN");
    }

    #[test]
    fn test_f64_entry_point() {
        assert_eq!(
            amount_to_words_f64(2500.50).unwrap(),
            "DOS MIL QUINIENTOS 50/100 MN"
        );
        assert_eq!(amount_to_words_f64(0.0).unwrap(), "CERO 00/100 MN");
        assert_eq!(amount_to_words_f64(10.999).unwrap(), "ONCE 00/100 MN");
        assert_eq!(amount_to_words_f64(0.1).unwrap(), "CERO 10/100 MN");
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(
            amount_to_words(Decimal::from_str("-1").unwrap()),
            Err(InvalidAmount::Negative)
        );
        assert_eq!(amount_to_words_f64(-0.01), Err(InvalidAmount::Negative));
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert_eq!(amount_to_words_f64(-0.0).unwrap(), "CERO 00/100 MN");
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(amount_to_words_f64(f64::NAN), Err(InvalidAmount::NotFinite));
        assert_eq!(
            amount_to_words_f64(f64::INFINITY),
            Err(InvalidAmount::NotFinite)
        );
        assert_eq!(
            amount_to_words_f64(f64::NEG_INFINITY),
            Err(InvalidAmount::NotFinite)
        );
    }

    #[test]
    fn test_rejects_too_large() {
        assert_eq!(
            integer_to_words(MAX_AMOUNT_EXCLUSIVE),
            Err(InvalidAmount::TooLarge)
        );
        assert_eq!(
            amount_to_words(Decimal::from(MAX_AMOUNT_EXCLUSIVE)),
            Err(InvalidAmount::TooLarge)
        );
        // rounds up into the unnamed tier
        assert_eq!(
            amount_to_words(Decimal::from_str("999999999999.995").unwrap()),
            Err(InvalidAmount::TooLarge)
        );
        assert!(amount_to_words(Decimal::from_str("999999999999.99").unwrap()).is_ok());
        assert_eq!(amount_to_words_f64(1e20), Err(InvalidAmount::TooLarge));
    }

    #[test]
    fn test_deterministic_and_well_formed() {
        for n in [0u64, 1, 7, 21, 100, 1000, 1100, 21_021, 1_000_000, 987_654_321] {
            let a = int(n);
            let b = int(n);
            assert_eq!(a, b);
            assert!(!a.contains("  "), "double space in {:?}", a);
            assert_eq!(a.trim(), a);
            assert_eq!(a.to_uppercase(), a);
        }
    }
}
