//! PDF table rendering.
//!
//! Builds PDF 1.4 files by hand with the built-in Helvetica fonts, so no font
//! files are needed. Each sheet of the model starts a new page and is drawn
//! as one table: a bold header row on a grey band followed by the data rows
//! with alternating shading. Sheets that do not fit on one page continue on
//! the next page with the header repeated.
//!
//! Output is deterministic: the same model always produces the same bytes.

use std::path::Path;

use tracing::debug;

use crate::error::RenderError;
use crate::model::{Sheet, TabularModel};

/// A4 portrait, in points.
const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;
const MARGIN: f64 = 56.0;
const USABLE_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f64 = 16.0;
const TITLE_GAP: f64 = 12.0;
const HEADER_SIZE: f64 = 10.0;
const BODY_SIZE: f64 = 9.0;
const ROW_HEIGHT: f64 = 18.0;
const CELL_PADDING: f64 = 4.0;

const FONT_BOLD: &str = "F1";
const FONT_REGULAR: &str = "F2";

const HEADER_FILL: &str = "0.9 0.9 0.9";
const STRIPE_FILL: &str = "0.96 0.96 0.96";

/// Render the model as a PDF document at `path`.
pub fn render_document(model: &TabularModel, path: &Path) -> Result<(), RenderError> {
    let bytes = generate_document(model)?;
    std::fs::write(path, bytes)?;
    debug!("Wrote document to {}", path.display());
    Ok(())
}

/// Render the model as PDF bytes.
pub fn generate_document(model: &TabularModel) -> Result<Vec<u8>, RenderError> {
    let mut builder = PdfBuilder::new();
    for sheet in model.sheets() {
        render_sheet(sheet, &mut builder)?;
    }
    Ok(builder.build(&model.sheet_names().join(", ")))
}

fn render_sheet(sheet: &Sheet, builder: &mut PdfBuilder) -> Result<(), RenderError> {
    let rows = sheet.ordered_rows()?;
    let headers: Vec<&str> = sheet.columns().iter().map(String::as_str).collect();
    let col_width = USABLE_WIDTH / headers.len().max(1) as f64;

    let mut page = TablePage::start(sheet.name(), &headers, col_width);
    let mut pages = 1;

    for (row_idx, cells) in rows.iter().enumerate() {
        if !page.has_room() {
            builder.add_page(page.finish());
            let title = format!("{} (continued)", sheet.name());
            page = TablePage::start(&title, &headers, col_width);
            pages += 1;
        }
        page.data_row(row_idx, cells);
    }
    builder.add_page(page.finish());

    debug!(
        sheet = sheet.name(),
        rows = rows.len(),
        pages,
        "Rendered sheet table"
    );
    Ok(())
}

/// Content stream of one page holding (part of) a table.
struct TablePage {
    content: String,
    col_width: f64,
    columns: usize,
    table_top: f64,
    y: f64,
}

impl TablePage {
    /// Start a page with a title and the table header row.
    fn start(title: &str, headers: &[&str], col_width: f64) -> Self {
        let mut page = Self {
            content: String::new(),
            col_width,
            columns: headers.len(),
            table_top: 0.0,
            y: PAGE_HEIGHT - MARGIN,
        };

        page.content.push_str("0 0 0 rg\n");
        page.text(MARGIN, page.y - TITLE_SIZE, FONT_BOLD, TITLE_SIZE, title);
        page.y -= TITLE_SIZE + TITLE_GAP;
        page.table_top = page.y;

        page.band(HEADER_FILL);
        page.cells(headers, FONT_BOLD, HEADER_SIZE);
        page
    }

    fn has_room(&self) -> bool {
        self.y - ROW_HEIGHT >= MARGIN
    }

    fn data_row(&mut self, row_idx: usize, cells: &[&str]) {
        if row_idx % 2 == 0 {
            self.band(STRIPE_FILL);
        }
        self.cells(cells, FONT_REGULAR, BODY_SIZE);
    }

    /// Shaded background for the row about to be drawn.
    fn band(&mut self, fill: &str) {
        self.content.push_str(&format!(
            "{fill} rg\n{MARGIN:.2} {:.2} {USABLE_WIDTH:.2} {ROW_HEIGHT:.2} re f\n",
            self.y - ROW_HEIGHT
        ));
    }

    /// Draw one row of cells, each clipped to its column box.
    fn cells(&mut self, cells: &[&str], font: &str, size: f64) {
        let bottom = self.y - ROW_HEIGHT;
        self.content.push_str("0 0 0 rg\n");
        for (col_idx, cell) in cells.iter().enumerate() {
            let x = MARGIN + col_idx as f64 * self.col_width;
            self.content.push_str(&format!(
                "q\n{x:.2} {bottom:.2} {:.2} {ROW_HEIGHT:.2} re W n\n",
                self.col_width
            ));
            self.text(x + CELL_PADDING, bottom + 5.0, font, size, cell);
            self.content.push_str("Q\n");
        }
        self.y = bottom;
    }

    fn text(&mut self, x: f64, y: f64, font: &str, size: f64, value: &str) {
        self.content.push_str(&format!(
            "BT\n/{font} {size:.0} Tf\n{x:.2} {y:.2} Td\n({}) Tj\nET\n",
            pdf_escape(value)
        ));
    }

    /// Stroke the table border and column separators, return the stream.
    fn finish(mut self) -> String {
        let height = self.table_top - self.y;
        self.content.push_str("0.6 0.6 0.6 RG\n0.5 w\n");
        self.content.push_str(&format!(
            "{MARGIN:.2} {:.2} {USABLE_WIDTH:.2} {height:.2} re S\n",
            self.y
        ));
        for col_idx in 1..self.columns {
            let x = MARGIN + col_idx as f64 * self.col_width;
            self.content.push_str(&format!(
                "{x:.2} {:.2} m {x:.2} {:.2} l S\n",
                self.y, self.table_top
            ));
        }
        self.content
    }
}

/// WinAnsiEncoding code for characters in the 0x80-0x9F block.
fn win_ansi_code(c: char) -> Option<u8> {
    let code = match c {
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => return None,
    };
    Some(code)
}

/// Escape a value for a PDF string literal.
///
/// Fonts use WinAnsiEncoding: Latin-1 and the WinAnsi 0x80-0x9F glyphs are
/// written as octal escapes, anything else becomes `?`.
fn pdf_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => match win_ansi_code(c) {
                Some(code) => out.push_str(&format!("\\{code:03o}")),
                None => out.push('?'),
            },
        }
    }
    out
}

/// Minimal multi-page PDF file builder.
struct PdfBuilder {
    pages: Vec<String>,
}

impl PdfBuilder {
    fn new() -> Self {
        Self { pages: Vec::new() }
    }

    fn add_page(&mut self, content: String) {
        self.pages.push(content);
    }

    /// Build the complete PDF file as bytes.
    ///
    /// Object layout: 1 catalog, 2 page tree, 3-4 fonts, 5 info, then a
    /// page object and its content stream for every page.
    fn build(&self, title: &str) -> Vec<u8> {
        let page_obj = |idx: usize| 6 + 2 * idx;

        let mut objects: Vec<String> = Vec::with_capacity(5 + 2 * self.pages.len());
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".into());

        let kids = (0..self.pages.len())
            .map(|idx| format!("{} 0 R", page_obj(idx)))
            .collect::<Vec<_>>()
            .join(" ");
        objects.push(format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            self.pages.len()
        ));

        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .into(),
        );
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .into(),
        );
        objects.push(format!(
            "<< /Title ({}) /Producer (catalog_docs) >>",
            pdf_escape(title)
        ));

        for (idx, stream) in self.pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH:.0} {PAGE_HEIGHT:.0}] \
                 /Contents {} 0 R \
                 /Resources << /Font << /{FONT_BOLD} 3 0 R /{FONT_REGULAR} 4 0 R >> >> >>",
                page_obj(idx) + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (idx, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", idx + 1));
        }

        // Cross-reference table
        let xref_offset = pdf.len();
        let num_objects = offsets.len() + 1; // +1 for free entry
        pdf.push_str(&format!("xref\n0 {num_objects}\n"));
        pdf.push_str("0000000000 65535 f \n");
        for offset in &offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }

        pdf.push_str(&format!(
            "trailer\n<< /Size {num_objects} /Root 1 0 R /Info 5 0 R >>\n"
        ));
        pdf.push_str(&format!("startxref\n{xref_offset}\n%%EOF\n"));

        pdf.into_bytes()
    }
}
