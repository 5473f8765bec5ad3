// SPDX-License-Identifier: Apache-2.0

use crate::layout::{FontFace, Layout, Placed};
use crate::RenderError;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

/// Turns a laid-out certificate into document bytes.
pub trait DocumentBackend {
    fn render(&self, layout: &Layout, title: &str) -> Result<Vec<u8>, RenderError>;
}

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");

/// PDF output using the standard Helvetica faces and deflated content streams.
#[derive(Debug, Clone, Copy)]
pub struct PdfBackend {
    pub compression_level: u8,
}

impl Default for PdfBackend {
    fn default() -> Self {
        Self {
            compression_level: 6,
        }
    }
}

/// Maps text onto WinAnsiEncoding; unmappable characters become `?`.
#[must_use]
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

fn page_content(elements: &[Placed], page_height: f32) -> Vec<u8> {
    let mut content = Content::new();
    content.set_line_width(0.5);
    for element in elements {
        match element {
            Placed::Text {
                x,
                y,
                size,
                face,
                text,
            } => {
                let font = match face {
                    FontFace::Regular => REGULAR_FONT,
                    FontFace::Bold => BOLD_FONT,
                };
                let encoded = encode_win_ansi(text);
                content
                    .begin_text()
                    .set_font(font, *size)
                    .next_line(*x, page_height - *y)
                    .show(Str(&encoded))
                    .end_text();
            }
            Placed::Line { x1, y1, x2, y2 } => {
                content.move_to(*x1, page_height - *y1);
                content.line_to(*x2, page_height - *y2);
                content.stroke();
            }
            Placed::Rect {
                x,
                y,
                width,
                height,
            } => {
                content.rect(*x, page_height - *y - *height, *width, *height);
                content.stroke();
            }
        }
    }
    content.finish()
}

impl DocumentBackend for PdfBackend {
    fn render(&self, layout: &Layout, title: &str) -> Result<Vec<u8>, RenderError> {
        if layout.pages.is_empty() {
            return Err(RenderError::Pdf("layout has no pages".to_string()));
        }
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let pages_id = alloc.bump();
        let regular_id = alloc.bump();
        let bold_id = alloc.bump();
        let info_id = alloc.bump();
        let page_ids: Vec<Ref> = layout.pages.iter().map(|_| alloc.bump()).collect();
        let content_ids: Vec<Ref> = layout.pages.iter().map(|_| alloc.bump()).collect();

        let mut pdf = Pdf::new();
        pdf.set_version(1, 7);
        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(layout.pages.len() as i32);
        pdf.type1_font(regular_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.document_info(info_id)
            .title(TextStr(title))
            .producer(TextStr("millcert"));

        for (i, page) in layout.pages.iter().enumerate() {
            let raw = page_content(&page.elements, layout.height);
            let compressed =
                miniz_oxide::deflate::compress_to_vec_zlib(&raw, self.compression_level);
            pdf.stream(content_ids[i], &compressed)
                .filter(Filter::FlateDecode);

            let mut pdf_page = pdf.page(page_ids[i]);
            pdf_page
                .media_box(Rect::new(0.0, 0.0, layout.width, layout.height))
                .parent(pages_id)
                .contents(content_ids[i]);
            pdf_page
                .resources()
                .fonts()
                .pair(REGULAR_FONT, regular_id)
                .pair(BOLD_FONT, bold_id);
        }
        Ok(pdf.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Page;

    #[test]
    fn win_ansi_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(encode_win_ansi("Temp \u{b0}C"), b"Temp \xb0C".to_vec());
        assert_eq!(encode_win_ansi("\u{2013}"), vec![0x96]);
        assert_eq!(encode_win_ansi("\u{4e2d}"), b"?".to_vec());
    }

    #[test]
    fn backend_emits_one_pdf_page_per_layout_page() {
        let layout = Layout {
            width: 841.89,
            height: 595.28,
            pages: vec![
                Page {
                    elements: vec![Placed::Text {
                        x: 24.0,
                        y: 40.0,
                        size: 10.0,
                        face: FontFace::Bold,
                        text: "MILL TEST CERTIFICATE".to_string(),
                    }],
                },
                Page::default(),
            ],
            continued: Vec::new(),
        };
        let bytes = PdfBackend::default().render(&layout, "DOC-1").expect("pdf");
        assert!(bytes.starts_with(b"%PDF-1.7"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/Helvetica-Bold"));
    }

    #[test]
    fn empty_layout_is_rejected() {
        let layout = Layout {
            width: 1.0,
            height: 1.0,
            pages: Vec::new(),
            continued: Vec::new(),
        };
        assert!(matches!(
            PdfBackend::default().render(&layout, "x"),
            Err(RenderError::Pdf(_))
        ));
    }
}
