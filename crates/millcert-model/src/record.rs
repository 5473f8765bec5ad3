// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use millcert_core::text::{format_number, non_blank_owned};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::serde_helpers::{lenient_date, lenient_f64, lenient_id, lenient_string};

/// Heat number identifying one batch of material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(String);

impl LotId {
    /// Trims surrounding whitespace; returns `None` for blank input.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LotId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(ParseError::BlankLotId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    BlankLotId,
    UnknownParmType(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankLotId => f.write_str("lot id must not be blank"),
            Self::UnknownParmType(raw) => write!(f, "unknown parameter type `{raw}`"),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParmType {
    ChemicalComposition,
    PhysicalProperty,
    ImpactTest,
}

impl ParmType {
    /// Case, spacing and underscores are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "chemicalcomposition" | "chemical" | "chemistry" => Some(Self::ChemicalComposition),
            "physicalproperty" | "physicalproperties" | "physical" => Some(Self::PhysicalProperty),
            "impacttest" | "impacttests" | "impact" => Some(Self::ImpactTest),
            _ => None,
        }
    }
}

impl FromStr for ParmType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseError::UnknownParmType(s.to_string()))
    }
}

/// Flat upstream row, exactly as the parameter store returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawParameterRecord {
    #[serde(
        alias = "HeatNo",
        alias = "Heat_No",
        default,
        deserialize_with = "lenient_id::deserialize"
    )]
    pub lot_id: String,
    /// Non-string values (e.g. numeric enum codes) decode as text and end up
    /// [`ParameterPayload::Unrecognized`].
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub parm_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub parm_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub value_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub value_numeric: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub impact_temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub impact_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub impact_value1: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub impact_value2: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub impact_value3: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub impact_average: Option<String>,
    #[serde(alias = "Lab_Name", default, deserialize_with = "lenient_string::deserialize")]
    pub lab_name: Option<String>,
    #[serde(alias = "Lab_TC_No", default, deserialize_with = "lenient_string::deserialize")]
    pub lab_report_no: Option<String>,
    #[serde(alias = "Lab_TC_Date", default, deserialize_with = "lenient_date::deserialize")]
    pub lab_report_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabMetadata {
    pub lab_name: Option<String>,
    pub lab_report_no: Option<String>,
    pub lab_report_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterValue {
    pub text: Option<String>,
    pub numeric: Option<f64>,
}

impl ParameterValue {
    /// Text wins over the numeric column when both are present.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        if let Some(text) = &self.text {
            return Some(text.trim().to_string());
        }
        self.numeric.and_then(format_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImpactReading {
    pub temperature: Option<f64>,
    pub size: Option<String>,
    pub value1: Option<String>,
    pub value2: Option<String>,
    pub value3: Option<String>,
    pub average: Option<String>,
}

impl ImpactReading {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.size.is_none()
            && self.value1.is_none()
            && self.value2.is_none()
            && self.value3.is_none()
            && self.average.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterPayload {
    Chemical {
        element: Option<String>,
        value: ParameterValue,
    },
    Physical {
        property: Option<String>,
        value: ParameterValue,
    },
    Impact(ImpactReading),
    /// Missing or unknown `ParmType`; contributes lab metadata only.
    Unrecognized { parm_type: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRecord {
    pub lot_id: LotId,
    pub lab: LabMetadata,
    pub payload: ParameterPayload,
}

impl ParameterRecord {
    /// Returns `None` when the row carries no usable lot id.
    #[must_use]
    pub fn from_raw(raw: RawParameterRecord) -> Option<Self> {
        let lot_id = LotId::parse(&raw.lot_id)?;
        let lab = LabMetadata {
            lab_name: non_blank_owned(raw.lab_name),
            lab_report_no: non_blank_owned(raw.lab_report_no),
            lab_report_date: raw.lab_report_date,
        };
        let value = ParameterValue {
            text: non_blank_owned(raw.value_text),
            numeric: raw.value_numeric.filter(|v| v.is_finite()),
        };
        let name = non_blank_owned(raw.parm_name).map(|n| n.trim().to_string());
        let payload = match raw.parm_type.as_deref().and_then(ParmType::parse) {
            Some(ParmType::ChemicalComposition) => ParameterPayload::Chemical {
                element: name,
                value,
            },
            Some(ParmType::PhysicalProperty) => ParameterPayload::Physical {
                property: name,
                value,
            },
            Some(ParmType::ImpactTest) => ParameterPayload::Impact(ImpactReading {
                temperature: raw.impact_temperature,
                size: non_blank_owned(raw.impact_size).map(|s| s.trim().to_string()),
                value1: non_blank_owned(raw.impact_value1),
                value2: non_blank_owned(raw.impact_value2),
                value3: non_blank_owned(raw.impact_value3),
                average: non_blank_owned(raw.impact_average),
            }),
            None => ParameterPayload::Unrecognized {
                parm_type: raw.parm_type,
            },
        };
        Some(Self {
            lot_id,
            lab,
            payload,
        })
    }

    #[must_use]
    pub fn parm_type(&self) -> Option<ParmType> {
        match self.payload {
            ParameterPayload::Chemical { .. } => Some(ParmType::ChemicalComposition),
            ParameterPayload::Physical { .. } => Some(ParmType::PhysicalProperty),
            ParameterPayload::Impact(_) => Some(ParmType::ImpactTest),
            ParameterPayload::Unrecognized { .. } => None,
        }
    }
}

/// Converts a raw batch, dropping rows without a lot id.
#[must_use]
pub fn decode_records(raw: Vec<RawParameterRecord>) -> Vec<ParameterRecord> {
    raw.into_iter().filter_map(ParameterRecord::from_raw).collect()
}
