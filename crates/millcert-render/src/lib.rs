// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Certificate assembly and rendering: section IR, two-region layout and
//! PDF emission.

use std::fmt::{Display, Formatter};

mod artifact;
mod assemble;
mod config;
mod layout;
mod pdf;
mod pipeline;
mod sections;

pub use artifact::artifact_name;
pub use assemble::{assemble, referenced_heat_numbers};
pub use config::{
    resolve_render_config, validate_render_config, ConfigError, ConfigSource, PageGeometry,
    RenderConfig, CONFIG_SCHEMA_VERSION,
};
pub use layout::{clip_to_width, lay_out, text_width, FontFace, Layout, Page, Placed};
pub use pdf::{encode_win_ansi, DocumentBackend, PdfBackend};
pub use pipeline::{
    generate_certificate, render_certificate, render_with, RenderedCertificate,
};
pub use sections::{
    build_sections, section, Block, Column, Region, Section, SectionKind, TextLine, TextStyle,
};

pub const CRATE_NAME: &str = "millcert-render";

#[derive(Debug)]
pub enum RenderError {
    MissingDocumentNumber,
    Config(ConfigError),
    Io(String),
    Pdf(String),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDocumentNumber => {
                f.write_str("certificate header has no document number to name the output")
            }
            Self::Config(err) => write!(f, "render config: {err}"),
            Self::Io(msg) => write!(f, "output: {msg}"),
            Self::Pdf(msg) => write!(f, "pdf: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for RenderError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
