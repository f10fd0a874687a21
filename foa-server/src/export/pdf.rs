//! Table PDF writer
//!
//! Produces a plain PDF 1.4 document: a title on the first page and a table
//! laid out in equal-width columns, paginated on A4 landscape.
//!
//! With a [`PdfFont`] the TrueType file is embedded (Type0, Identity-H) and
//! every character the font covers is rendered, the cedi sign included.
//! Without one the built-in Helvetica is used, which is limited to Latin-1.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use super::ExportError;

/// A4 landscape in points
const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;
const MARGIN: f32 = 40.0;
const TITLE_SIZE: f32 = 16.0;
const FONT_SIZE: f32 = 10.0;
const ROW_HEIGHT: f32 = 18.0;
/// Average Helvetica glyph width relative to the font size
const GLYPH_RATIO: f32 = 0.5;
/// Entries per `beginbfchar` block
const BFCHAR_CHUNK: usize = 100;

/// TrueType font to embed in exports
#[derive(Clone)]
pub struct PdfFont {
    name: String,
    data: Arc<[u8]>,
}

impl std::fmt::Debug for PdfFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfFont")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PdfFont {
    /// Validate font bytes; `name` becomes the PDF base font name
    pub fn from_bytes(name: &str, data: Vec<u8>) -> Result<Self, ExportError> {
        ttf_parser::Face::parse(&data, 0).map_err(|e| ExportError::Font(e.to_string()))?;
        let name: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        Ok(Self {
            name: if name.is_empty() { "Embedded".to_string() } else { name },
            data: data.into(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let data = std::fs::read(path)?;
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        Self::from_bytes(stem, data)
    }
}

/// Font-wide metrics in font units
struct FontMetrics {
    ascent: i16,
    descent: i16,
    cap_height: i16,
    bbox: [i16; 4],
}

/// Glyph lookups over an embeddable font
trait GlyphSource {
    fn glyph_id(&self, c: char) -> Option<u16>;
    fn advance(&self, gid: u16) -> u16;
    fn em_units(&self) -> u16;
    fn metrics(&self) -> FontMetrics;
}

impl GlyphSource for ttf_parser::Face<'_> {
    fn glyph_id(&self, c: char) -> Option<u16> {
        self.glyph_index(c).map(|g| g.0)
    }

    fn advance(&self, gid: u16) -> u16 {
        self.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0)
    }

    fn em_units(&self) -> u16 {
        ttf_parser::Face::units_per_em(self)
    }

    fn metrics(&self) -> FontMetrics {
        let bbox = self.global_bounding_box();
        FontMetrics {
            ascent: self.ascender(),
            descent: self.descender(),
            cap_height: self.capital_height().unwrap_or_else(|| self.ascender()),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
        }
    }
}

/// How text turns into `Tj` operands
enum Glyphs<'a> {
    Standard,
    Embedded {
        source: &'a dyn GlyphSource,
        file: &'a [u8],
        name: &'a str,
        /// glyph id -> first character drawn with it
        used: BTreeMap<u16, char>,
    },
}

impl<'a> Glyphs<'a> {
    fn embedded(source: &'a dyn GlyphSource, file: &'a [u8], name: &'a str) -> Self {
        Self::Embedded {
            source,
            file,
            name,
            used: BTreeMap::new(),
        }
    }

    /// Rendered width in points
    fn width(&self, text: &str, size: f32) -> f32 {
        match self {
            Self::Standard => text.chars().count() as f32 * size * GLYPH_RATIO,
            Self::Embedded { source, .. } => {
                let units: f32 = text
                    .chars()
                    .map(|c| f32::from(source.advance(glyph_for(*source, c))))
                    .sum();
                units * size / f32::from(source.em_units().max(1))
            }
        }
    }

    /// String operand for `Tj`
    fn encode(&mut self, text: &str) -> String {
        match self {
            Self::Standard => format!("({})", latin1_text(text)),
            Self::Embedded { source, used, .. } => {
                let mut out = String::with_capacity(text.len() * 4 + 2);
                out.push('<');
                for c in text.chars() {
                    let c = if c.is_control() { ' ' } else { c };
                    let gid = glyph_for(*source, c);
                    used.entry(gid).or_insert(c);
                    out.push_str(&format!("{gid:04X}"));
                }
                out.push('>');
                out
            }
        }
    }

    /// Font objects numbered from 3 and the page font resources
    fn font_objects(&self) -> (Vec<Vec<u8>>, &'static str) {
        match self {
            Self::Standard => (
                vec![
                    b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec(),
                    b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                        .to_vec(),
                ],
                "/F1 3 0 R /F2 4 0 R",
            ),
            Self::Embedded {
                source,
                file,
                name,
                used,
            } => (embedded_font_objects(*source, file, name, used), "/F1 3 0 R /F2 3 0 R"),
        }
    }
}

/// Missing characters fall back to `?`, then to `.notdef`
fn glyph_for(source: &dyn GlyphSource, c: char) -> u16 {
    source
        .glyph_id(c)
        .or_else(|| source.glyph_id('?'))
        .unwrap_or(0)
}

fn stream_object(extra: &str, bytes: &[u8]) -> Vec<u8> {
    let mut out = format!("<< /Length {}{extra} >>\nstream\n", bytes.len()).into_bytes();
    out.extend_from_slice(bytes);
    out.extend_from_slice(b"\nendstream");
    out
}

fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<(&u16, &char)> = used.iter().collect();
    for chunk in entries.chunks(BFCHAR_CHUNK) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, c) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            cmap.push_str(&format!("<{gid:04X}> <{utf16}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend");
    cmap
}

/// Objects 3..=7: Type0 font, CID font, descriptor, font file, ToUnicode
fn embedded_font_objects(
    source: &dyn GlyphSource,
    file: &[u8],
    name: &str,
    used: &BTreeMap<u16, char>,
) -> Vec<Vec<u8>> {
    let em = f32::from(source.em_units().max(1));
    let scale = |v: i16| (f32::from(v) * 1000.0 / em).round() as i32;
    let widths: Vec<String> = used
        .keys()
        .map(|&gid| format!("{gid} [{}]", (f32::from(source.advance(gid)) * 1000.0 / em).round() as i32))
        .collect();
    let m = source.metrics();

    vec![
        format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{name} /Encoding /Identity-H \
             /DescendantFonts [4 0 R] /ToUnicode 7 0 R >>"
        )
        .into_bytes(),
        format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{name} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor 5 0 R /CIDToGIDMap /Identity /DW 1000 /W [{}] >>",
            widths.join(" ")
        )
        .into_bytes(),
        format!(
            "<< /Type /FontDescriptor /FontName /{name} /Flags 32 /FontBBox [{} {} {} {}] \
             /ItalicAngle 0 /Ascent {} /Descent {} /CapHeight {} /StemV 80 /FontFile2 6 0 R >>",
            scale(m.bbox[0]),
            scale(m.bbox[1]),
            scale(m.bbox[2]),
            scale(m.bbox[3]),
            scale(m.ascent),
            scale(m.descent),
            scale(m.cap_height),
        )
        .into_bytes(),
        stream_object(&format!(" /Length1 {}", file.len()), file),
        stream_object("", to_unicode_cmap(used).as_bytes()),
    ]
}

/// Fluent builder for a titled table document
pub struct PdfTableBuilder {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    font: Option<PdfFont>,
}

/// Latin-1 text with PDF string escaping; the cedi sign becomes `C`
fn latin1_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            '\u{20B5}' => out.push('C'),
            c if (c as u32) < 0x20 => out.push(' '),
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Cut text to what fits in `width` points
fn fit(value: &str, width: f32, measure: impl Fn(&str) -> f32) -> String {
    let room = width - 4.0;
    if measure(value) <= room {
        return value.to_string();
    }
    let ellipsis = measure("...");
    let mut cut = String::new();
    for c in value.chars() {
        cut.push(c);
        if measure(&cut) + ellipsis > room {
            cut.pop();
            break;
        }
    }
    cut.push_str("...");
    cut
}

impl PdfTableBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            headers: Vec::new(),
            rows: Vec::new(),
            font: None,
        }
    }

    pub fn headers(mut self, headers: &[&str]) -> Self {
        self.headers = headers.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn row(mut self, cells: Vec<String>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Embed `font` instead of Helvetica
    pub fn font(mut self, font: Option<PdfFont>) -> Self {
        self.font = font;
        self
    }

    fn column_width(&self) -> f32 {
        (PAGE_WIDTH - 2.0 * MARGIN) / self.headers.len().max(1) as f32
    }

    fn text_at(glyphs: &mut Glyphs<'_>, ops: &mut String, font: &str, size: f32, x: f32, y: f32, text: &str) {
        ops.push_str(&format!(
            "BT /{font} {size} Tf {x:.1} {y:.1} Td {} Tj ET\n",
            glyphs.encode(text)
        ));
    }

    fn table_row(&self, glyphs: &mut Glyphs<'_>, ops: &mut String, font: &str, y: f32, cells: &[String]) {
        let width = self.column_width();
        for (i, cell) in cells.iter().enumerate().take(self.headers.len().max(1)) {
            let x = MARGIN + i as f32 * width + 2.0;
            let text = fit(cell, width, |t| glyphs.width(t, FONT_SIZE));
            Self::text_at(glyphs, ops, font, FONT_SIZE, x, y, &text);
        }
    }

    fn header_block(&self, glyphs: &mut Glyphs<'_>, ops: &mut String, y: &mut f32) {
        self.table_row(glyphs, ops, "F2", *y, &self.headers);
        let line_y = *y - 4.0;
        ops.push_str(&format!(
            "{MARGIN:.1} {line_y:.1} m {:.1} {line_y:.1} l S\n",
            PAGE_WIDTH - MARGIN
        ));
        *y -= ROW_HEIGHT;
    }

    /// Content streams, one per page
    fn pages(&self, glyphs: &mut Glyphs<'_>) -> Vec<String> {
        let mut pages = Vec::new();
        let mut ops = String::new();
        let mut y = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
        Self::text_at(glyphs, &mut ops, "F2", TITLE_SIZE, MARGIN, y, &self.title);
        y -= ROW_HEIGHT * 1.5;
        self.header_block(glyphs, &mut ops, &mut y);

        for row in &self.rows {
            if y < MARGIN {
                pages.push(std::mem::take(&mut ops));
                y = PAGE_HEIGHT - MARGIN - FONT_SIZE;
                self.header_block(glyphs, &mut ops, &mut y);
            }
            self.table_row(glyphs, &mut ops, "F1", y, row);
            y -= ROW_HEIGHT;
        }
        pages.push(ops);
        pages
    }

    /// Serialize the document
    pub fn build(self) -> Vec<u8> {
        let Some(font) = &self.font else {
            return self.render(Glyphs::Standard);
        };
        match ttf_parser::Face::parse(&font.data, 0) {
            Ok(face) => self.render(Glyphs::embedded(&face, &font.data, &font.name)),
            Err(e) => {
                tracing::warn!(font = %font.name, error = %e, "Embedded font unreadable, using Helvetica");
                self.render(Glyphs::Standard)
            }
        }
    }

    fn render(&self, mut glyphs: Glyphs<'_>) -> Vec<u8> {
        let pages = self.pages(&mut glyphs);
        let page_count = pages.len();
        let (fonts, font_resources) = glyphs.font_objects();

        // 1 catalog, 2 page tree, fonts from 3, then (page, content) pairs
        let first_page = 3 + fonts.len();
        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", first_page + 2 * i))
            .collect();

        let mut objects: Vec<Vec<u8>> = vec![
            b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
            format!("<< /Type /Pages /Kids [{}] /Count {page_count} >>", kids.join(" ")).into_bytes(),
        ];
        objects.extend(fonts);
        for (i, content) in pages.iter().enumerate() {
            let content_id = first_page + 2 * i + 1;
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                     /Resources << /Font << {font_resources} >> >> /Contents {content_id} 0 R >>"
                )
                .into_bytes(),
            );
            // Latin-1 bytes, one per char (embedded text is hex, plain ASCII)
            let bytes: Vec<u8> = content.chars().map(|c| c as u32 as u8).collect();
            objects.push(stream_object("", &bytes));
        }

        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }
}
