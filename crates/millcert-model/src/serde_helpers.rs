// SPDX-License-Identifier: Apache-2.0

//! Lenient decoders for upstream fields whose JSON type is not reliable.
//!
//! Upstream rows come from hand-entered lab screens: numbers sometimes arrive
//! as strings and strings as numbers. Unusable values decode to `None`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

pub mod lenient_f64 {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Scalar>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Scalar::Int(v)) => Some(v as f64),
            Some(Scalar::Float(v)) if v.is_finite() => Some(v),
            Some(Scalar::Text(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        })
    }
}

pub mod lenient_string {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Scalar>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Scalar::Text(s)) => millcert_core::text::non_blank_owned(Some(s)),
            Some(Scalar::Int(v)) => Some(v.to_string()),
            Some(Scalar::Float(v)) => millcert_core::text::format_number(v),
            Some(Scalar::Bool(_)) | None => None,
        })
    }
}

/// Identifier columns: numbers are stringified, anything unusable is empty.
pub mod lenient_id {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(lenient_string::deserialize(deserializer)?.unwrap_or_default())
    }
}

pub mod lenient_date {
    use super::*;
    use chrono::NaiveDate;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Scalar>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Scalar::Text(s)) => millcert_core::text::parse_lenient_date(&s),
            _ => None,
        })
    }
}

pub mod lenient_u32 {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Scalar>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Scalar::Int(v)) => u32::try_from(v).ok(),
            Some(Scalar::Text(s)) => s.trim().parse::<u32>().ok(),
            _ => None,
        })
    }
}
