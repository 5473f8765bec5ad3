#![forbid(unsafe_code)]
//! Certificate model SSOT: upstream parameter rows, per-lot aggregates and
//! the certificate document handed to the renderer.

mod certificate;
mod lot;
mod record;
mod serde_helpers;

pub use certificate::{
    CertificateDocument, CertificateHeader, CertificateInput, HeatTest, ItemLine, OtherTest,
    ReferencedLots, Remark,
};
pub use lot::{
    ChemicalEntry, ImpactTest, LotAggregate, LotLookup, NamedValue, PhysicalEntry,
    IMPACT_KEY_SENTINEL,
};
pub use record::{
    decode_records, ImpactReading, LabMetadata, LotId, ParameterPayload, ParameterRecord,
    ParameterValue, ParmType, ParseError, RawParameterRecord,
};

pub const CRATE_NAME: &str = "millcert-model";
