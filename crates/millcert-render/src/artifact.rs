// SPDX-License-Identifier: Apache-2.0

use crate::RenderError;
use millcert_core::text::non_blank;

/// `{prefix}{document number}.pdf`, with anything outside `[A-Za-z0-9._-]`
/// replaced by `_`.
pub fn artifact_name(document_number: Option<&str>, prefix: &str) -> Result<String, RenderError> {
    let number = non_blank(document_number).ok_or(RenderError::MissingDocumentNumber)?;
    Ok(format!("{}{}.pdf", sanitize(prefix), sanitize(number.trim())))
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
