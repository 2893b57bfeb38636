//! Serde helpers for SurrealDB records
//!
//! Record IDs deserialize from either form:
//! - `"table:id"` strings (API JSON)
//! - native SurrealDB record ids (database rows)
//!
//! and always serialize as `"table:id"` strings.

use serde::{Deserialize, Deserializer, Serializer};
use surrealdb::RecordId;

/// Deserialize bool that treats null as true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(true))
}

pub fn default_true() -> bool {
    true
}

#[derive(Debug, Clone)]
struct FlexibleRecordId(RecordId);

impl<'de> Deserialize<'de> for FlexibleRecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct FlexibleVisitor;

        impl<'de> Visitor<'de> for FlexibleVisitor {
            type Value = FlexibleRecordId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string 'table:id' or RecordId")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse::<RecordId>()
                    .map(FlexibleRecordId)
                    .map_err(|_| de::Error::custom(format!("invalid RecordId: {}", value)))
            }

            fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                RecordId::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(FlexibleRecordId)
            }
        }

        deserializer.deserialize_any(FlexibleVisitor)
    }
}

/// `RecordId` as `"table:id"`
pub mod record_id {
    use super::*;

    pub fn serialize<S>(id: &RecordId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<RecordId, D::Error>
    where
        D: Deserializer<'de>,
    {
        FlexibleRecordId::deserialize(d).map(|f| f.0)
    }
}

/// `Option<RecordId>` as `"table:id"` or null
pub mod option_record_id {
    use super::*;

    pub fn serialize<S>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<FlexibleRecordId>::deserialize(d).map(|opt| opt.map(|f| f.0))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| E::custom(format!("invalid number: {s:?}"))),
        }
    }
}

/// `f64` from a JSON number or a numeric string (`"1500.00"`)
pub mod numeric {
    use super::*;

    pub fn deserialize<'de, D>(d: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        NumberOrText::deserialize(d)?.into_f64()
    }
}

/// `Option<f64>` from a JSON number, a numeric string or null
pub mod option_numeric {
    use super::*;

    pub fn deserialize<'de, D>(d: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<NumberOrText>::deserialize(d)?
            .map(NumberOrText::into_f64)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Row {
        #[serde(with = "record_id")]
        id: RecordId,
        #[serde(default, with = "option_record_id")]
        owner: Option<RecordId>,
        #[serde(default = "default_true", deserialize_with = "bool_true")]
        active: bool,
    }

    #[test]
    fn test_string_ids_round_trip_through_json() {
        let row: Row =
            serde_json::from_str(r#"{"id":"asset:abc","owner":null,"active":null}"#).unwrap();
        assert_eq!(row.id.table(), "asset");
        assert!(row.owner.is_none());
        assert!(row.active);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], "asset:abc");
    }

    #[derive(Debug, Deserialize)]
    struct Priced {
        #[serde(deserialize_with = "numeric::deserialize")]
        amount: f64,
        #[serde(default, deserialize_with = "option_numeric::deserialize")]
        cost: Option<f64>,
    }

    #[test]
    fn test_numeric_accepts_numbers_and_numeric_strings() {
        let p: Priced = serde_json::from_str(r#"{"amount":"1500.00","cost":12.5}"#).unwrap();
        assert_eq!(p.amount, 1500.0);
        assert_eq!(p.cost, Some(12.5));

        let p: Priced = serde_json::from_str(r#"{"amount":7}"#).unwrap();
        assert_eq!(p.amount, 7.0);
        assert!(p.cost.is_none());

        assert!(serde_json::from_str::<Priced>(r#"{"amount":"abc"}"#).is_err());
        assert!(serde_json::from_str::<Priced>(r#"{"amount":"NaN"}"#).is_err());
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        assert!(serde_json::from_str::<Row>(r#"{"id":42}"#).is_err());
    }
}
