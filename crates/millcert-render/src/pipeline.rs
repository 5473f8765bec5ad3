// SPDX-License-Identifier: Apache-2.0

use crate::artifact::artifact_name;
use crate::assemble::assemble;
use crate::config::RenderConfig;
use crate::layout::lay_out;
use crate::pdf::{DocumentBackend, PdfBackend};
use crate::sections::build_sections;
use crate::RenderError;
use millcert_core::sha256_hex;
use millcert_model::{CertificateDocument, CertificateInput};
use millcert_store::{FetchWarning, RecordSession};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCertificate {
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub sha256: String,
    pub page_count: usize,
    pub warnings: Vec<FetchWarning>,
}

impl RenderedCertificate {
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<(), RenderError> {
        sink.write_all(&self.bytes)
            .and_then(|()| sink.flush())
            .map_err(|e| RenderError::Io(format!("write {}: {e}", self.file_name)))
    }

    /// Writes `dir/<file_name>`, creating `dir` if needed.
    pub fn write_into(&self, dir: &Path) -> Result<PathBuf, RenderError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| RenderError::Io(format!("create {}: {e}", dir.display())))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .map_err(|e| RenderError::Io(format!("write {}: {e}", path.display())))?;
        Ok(path)
    }
}

/// Renders an assembled document with an explicit backend.
pub fn render_with(
    doc: &CertificateDocument,
    config: &RenderConfig,
    backend: &dyn DocumentBackend,
) -> Result<RenderedCertificate, RenderError> {
    let file_name = artifact_name(doc.header.document_number.as_deref(), &config.artifact_prefix)?;
    let sections = build_sections(doc, config);
    let layout = lay_out(&sections, config);
    let bytes = backend.render(&layout, &file_name)?;
    info!(
        file_name = %file_name,
        pages = layout.pages.len(),
        lots = doc.lots_by_item_heat_no.len(),
        bytes = bytes.len(),
        "certificate rendered"
    );
    Ok(RenderedCertificate {
        sha256: sha256_hex(&bytes),
        page_count: layout.pages.len(),
        file_name,
        bytes,
        warnings: Vec::new(),
    })
}

/// Renders an assembled document to PDF.
pub fn render_certificate(
    doc: &CertificateDocument,
    config: &RenderConfig,
) -> Result<RenderedCertificate, RenderError> {
    render_with(doc, config, &PdfBackend::default())
}

/// Fetch, aggregate, assemble and render one certificate.
///
/// The session fetch is the only suspension point. A failed fetch still
/// renders, with lot-dependent sections empty, and is reported through
/// `warnings`.
pub async fn generate_certificate(
    session: &mut RecordSession,
    input: CertificateInput,
    config: &RenderConfig,
) -> Result<RenderedCertificate, RenderError> {
    artifact_name(input.header.document_number.as_deref(), &config.artifact_prefix)?;
    let lots = session.lot_lookup().await;
    let doc = assemble(input, &lots);
    let mut rendered = render_certificate(&doc, config)?;
    rendered.warnings = session.warnings().to_vec();
    Ok(rendered)
}
