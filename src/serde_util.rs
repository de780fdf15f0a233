//! Lenient numeric fields.
//!
//! Decimal columns come back from the API as JSON strings (`"40.712800"`),
//! numbers, or `null` depending on the serializer.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(self) -> Option<f64> {
        match self {
            Numeric::Number(v) => Some(v),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// `null`, empty and unparseable strings become `None`.
pub(crate) fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Numeric>::deserialize(deserializer)?;
    Ok(raw.and_then(Numeric::value))
}

/// Like [`optional_f64`] but missing values read as zero.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_f64(deserializer)?.unwrap_or(0.0))
}
