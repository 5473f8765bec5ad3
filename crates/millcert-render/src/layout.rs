// SPDX-License-Identifier: Apache-2.0

//! Single layout pass over the section IR.
//!
//! Coordinates are PDF points measured down from the top-left corner of the
//! page. The left and right body regions each keep their own cursor; a body
//! section that ends below the footer band is moved to a continuation page
//! that carries only the title, header and footer.

use crate::config::RenderConfig;
use crate::sections::{Block, Column, Region, Section, SectionKind, TextLine, TextStyle};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFace {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Placed {
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        face: FontFace,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    /// `y` is the top edge.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub elements: Vec<Placed>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|el| match el {
            Placed::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text == needle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub pages: Vec<Page>,
    /// Body sections that did not fit and moved to a continuation page.
    pub continued: Vec<SectionKind>,
}

fn glyph_em(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.25,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '/' | '-' => 0.32,
        'm' | 'w' | 'M' | 'W' => 0.85,
        c if c.is_ascii_digit() => 0.556,
        c if c.is_ascii_uppercase() => 0.68,
        _ => 0.52,
    }
}

fn face_factor(face: FontFace) -> f32 {
    match face {
        FontFace::Regular => 1.0,
        FontFace::Bold => 1.06,
    }
}

/// Approximate Helvetica advance width of `text`.
#[must_use]
pub fn text_width(text: &str, size: f32, face: FontFace) -> f32 {
    text.chars().map(glyph_em).sum::<f32>() * size * face_factor(face)
}

/// Cuts `text` so it fits within `max_width`.
#[must_use]
pub fn clip_to_width(text: &str, max_width: f32, size: f32, face: FontFace) -> String {
    let scale = size * face_factor(face);
    let mut used = 0.0;
    let mut out = String::new();
    for c in text.chars() {
        let advance = glyph_em(c) * scale;
        if used + advance > max_width {
            break;
        }
        used += advance;
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f32,
    width: f32,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    page: usize,
    y: f32,
    /// Where this region starts on its current page.
    start: f32,
}

struct Placer<'a> {
    config: &'a RenderConfig,
    out: Vec<Placed>,
}

impl<'a> Placer<'a> {
    fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            out: Vec::new(),
        }
    }

    fn text(&mut self, x: f32, y: f32, size: f32, face: FontFace, text: String) {
        if text.is_empty() {
            return;
        }
        self.out.push(Placed::Text {
            x,
            y,
            size,
            face,
            text,
        });
    }

    fn hline(&mut self, x: f32, width: f32, y: f32) {
        self.out.push(Placed::Line {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y,
        });
    }

    fn vline(&mut self, x: f32, top: f32, bottom: f32) {
        self.out.push(Placed::Line {
            x1: x,
            y1: top,
            x2: x,
            y2: bottom,
        });
    }

    fn baseline(&self, row_top: f32, size: f32) -> f32 {
        row_top + (self.config.row_height + size * 0.7) / 2.0
    }

    fn cell(&mut self, x: f32, width: f32, row_top: f32, face: FontFace, raw: &str) {
        let size = self.config.font_size;
        let clipped = clip_to_width(raw, (width - 4.0).max(0.0), size, face);
        let y = self.baseline(row_top, size);
        self.text(x + 2.0, y, size, face, clipped);
    }

    /// Places `block` starting at `top`; returns the y just below it.
    fn block(&mut self, block: &Block, frame: Frame, top: f32) -> f32 {
        match block {
            Block::Text { lines } => self.text_block(lines, frame, top),
            Block::KeyValue { rows } => self.key_value(rows, frame, top),
            Block::Table {
                title,
                columns,
                rows,
            } => {
                let y = self.title(title.as_deref(), frame, top);
                self.table(columns, rows, frame, y)
            }
            Block::List { title, lines } => {
                let mut y = self.title(title.as_deref(), frame, top);
                for line in lines {
                    self.cell(frame.x, frame.width, y, FontFace::Regular, line);
                    y += self.config.row_height;
                }
                y
            }
        }
    }

    fn title(&mut self, title: Option<&str>, frame: Frame, top: f32) -> f32 {
        match title {
            Some(title) => {
                self.cell(frame.x, frame.width, top, FontFace::Bold, title);
                top + self.config.row_height
            }
            None => top,
        }
    }

    fn text_block(&mut self, lines: &[TextLine], frame: Frame, top: f32) -> f32 {
        let mut y = top;
        for line in lines {
            let (size, face) = match line.style {
                Some(TextStyle::Title) => (self.config.title_font_size, FontFace::Bold),
                Some(TextStyle::Subtitle) => (self.config.subtitle_font_size, FontFace::Regular),
                Some(TextStyle::Strong) => (self.config.font_size, FontFace::Bold),
                Some(TextStyle::Body) | None => (self.config.font_size, FontFace::Regular),
            };
            let height = (size * 1.3).max(self.config.row_height);
            let baseline = y + (height + size * 0.7) / 2.0;
            let half = frame.width / 2.0;
            let left = clip_to_width(&line.left, half, size, face);
            self.text(frame.x + 2.0, baseline, size, face, left);
            let center = clip_to_width(&line.center, frame.width, size, face);
            let center_x = frame.x + (frame.width - text_width(&center, size, face)) / 2.0;
            self.text(center_x, baseline, size, face, center);
            let right = clip_to_width(&line.right, half, size, face);
            let right_x = frame.x + frame.width - text_width(&right, size, face) - 2.0;
            self.text(right_x, baseline, size, face, right);
            y += height;
        }
        y
    }

    fn key_value(&mut self, rows: &[Vec<(String, String)>], frame: Frame, top: f32) -> f32 {
        let row_height = self.config.row_height;
        let mut y = top;
        for (row_index, row) in rows.iter().enumerate() {
            let count = row.len().max(1) as f32;
            let cell_width = frame.width / count;
            let key_width = cell_width * 0.35;
            for (i, (key, value)) in row.iter().enumerate() {
                let x = frame.x + cell_width * i as f32;
                self.cell(x, key_width, y, FontFace::Bold, key);
                self.cell(x + key_width, cell_width - key_width, y, FontFace::Regular, value);
                if i > 0 {
                    self.vline(x, y, y + row_height);
                }
            }
            y += row_height;
            if row_index + 1 < rows.len() {
                self.hline(frame.x, frame.width, y);
            }
        }
        self.out.push(Placed::Rect {
            x: frame.x,
            y: top,
            width: frame.width,
            height: y - top,
        });
        y
    }

    fn table(&mut self, columns: &[Column], rows: &[Vec<String>], frame: Frame, top: f32) -> f32 {
        let row_height = self.config.row_height;
        let total: f32 = columns.iter().map(|c| c.weight.max(0.0)).sum::<f32>().max(f32::EPSILON);
        let widths: Vec<f32> = columns
            .iter()
            .map(|c| frame.width * c.weight.max(0.0) / total)
            .collect();
        let mut x = frame.x;
        for (column, width) in columns.iter().zip(&widths) {
            self.cell(x, *width, top, FontFace::Bold, &column.label);
            x += width;
        }
        let mut y = top + row_height;
        for row in rows {
            self.hline(frame.x, frame.width, y);
            let mut x = frame.x;
            for (value, width) in row.iter().zip(&widths) {
                self.cell(x, *width, y, FontFace::Regular, value);
                x += width;
            }
            y += row_height;
        }
        let mut x = frame.x;
        for width in widths.iter().take(widths.len().saturating_sub(1)) {
            x += width;
            self.vline(x, top, y);
        }
        self.out.push(Placed::Rect {
            x: frame.x,
            y: top,
            width: frame.width,
            height: y - top,
        });
        y
    }
}

struct PageBuilder<'a> {
    config: &'a RenderConfig,
    furniture: Vec<&'a Section>,
    pages: Vec<Page>,
    /// Body start below the repeated title and header.
    body_top: f32,
}

impl<'a> PageBuilder<'a> {
    fn place(&self, block: &Block, frame: Frame, top: f32) -> (Vec<Placed>, f32) {
        let mut placer = Placer::new(self.config);
        let end = placer.block(block, frame, top);
        (placer.out, end)
    }

    fn open_page(&mut self) {
        let g = &self.config.page;
        let full = Frame {
            x: g.margin,
            width: g.content_width(),
        };
        let mut page = Page::default();
        let mut y = g.margin;
        for section in &self.furniture {
            let top = if section.kind == SectionKind::Footer {
                g.body_limit() + self.config.section_gap
            } else {
                y
            };
            let (elements, end) = self.place(&section.block, full, top);
            page.elements.extend(elements);
            if section.kind != SectionKind::Footer {
                y = end + self.config.section_gap;
            }
        }
        self.body_top = y;
        self.pages.push(page);
        debug!(page = self.pages.len(), "opened certificate page");
    }

    fn ensure_page(&mut self, index: usize) {
        while self.pages.len() <= index {
            self.open_page();
        }
    }
}

/// Places every section on fixed-size pages.
#[must_use]
pub fn lay_out(sections: &[Section], config: &RenderConfig) -> Layout {
    let g = &config.page;
    let mut builder = PageBuilder {
        config,
        furniture: sections
            .iter()
            .filter(|s| s.kind.is_page_furniture())
            .collect(),
        pages: Vec::new(),
        body_top: g.margin,
    };
    builder.ensure_page(0);

    let full = Frame {
        x: g.margin,
        width: g.content_width(),
    };
    let mut y = builder.body_top;
    for section in sections
        .iter()
        .filter(|s| s.region == Region::Full && !s.kind.is_page_furniture())
    {
        let (elements, end) = builder.place(&section.block, full, y);
        builder.pages[0].elements.extend(elements);
        y = end + config.section_gap;
    }

    let mut left = Cursor {
        page: 0,
        y,
        start: y,
    };
    let mut right = left;
    let mut continued = Vec::new();
    for section in sections {
        let (cursor, frame) = match section.region {
            Region::Full => continue,
            Region::Left => (
                &mut left,
                Frame {
                    x: g.margin,
                    width: g.left_width(),
                },
            ),
            Region::Right => (
                &mut right,
                Frame {
                    x: g.right_x(),
                    width: g.right_width(),
                },
            ),
        };
        let (mut elements, mut end) = builder.place(&section.block, frame, cursor.y);
        if end > g.body_limit() && cursor.y > cursor.start {
            cursor.page += 1;
            builder.ensure_page(cursor.page);
            cursor.start = builder.body_top;
            warn!(
                section = ?section.kind,
                page = cursor.page + 1,
                "section does not fit above the footer; continued on next page"
            );
            continued.push(section.kind);
            (elements, end) = builder.place(&section.block, frame, cursor.start);
        }
        if end > g.body_limit() {
            warn!(section = ?section.kind, "section taller than a page body; footer overlaps");
        }
        builder.pages[cursor.page].elements.extend(elements);
        cursor.y = end + config.section_gap;
    }

    Layout {
        width: g.width,
        height: g.height,
        pages: builder.pages,
        continued,
    }
}
