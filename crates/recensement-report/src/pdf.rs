//! Minimal PDF 1.4 table writer.
//!
//! Produces an A4 document using the two standard Helvetica faces, so no font
//! is embedded. Text is encoded with `WinAnsiEncoding`; characters outside it
//! are replaced by `?`.

use std::io::Write;

use recensement_core::view::CityRow;

use crate::Result;

// ─── Layout ──────────────────────────────────────────────────────────────────

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;

const TITLE_SIZE: f32 = 16.0;
const TITLE_BASELINE: f32 = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
const TABLE_TOP_FIRST: f32 = TITLE_BASELINE - 24.0;
const TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN;
const TABLE_BOTTOM: f32 = MARGIN + 20.0;

const CELL_SIZE: f32 = 10.0;
const ROW_HEIGHT: f32 = 18.0;
const CELL_PADDING: f32 = 4.0;
const HEADER_GRAY: f32 = 0.85;

#[derive(Clone, Copy)]
enum Align {
  Left,
  Right,
}

struct Column {
  title: &'static str,
  /// Share of the usable page width.
  ratio: f32,
  align: Align,
}

const COLUMNS: [Column; 4] = [
  Column { title: "NOM VILLE", ratio: 0.36, align: Align::Left },
  Column { title: "POPULATION", ratio: 0.16, align: Align::Right },
  Column { title: "CODE DEPARTEMENT", ratio: 0.22, align: Align::Left },
  Column { title: "NOM DEPARTEMENT", ratio: 0.26, align: Align::Left },
];

fn cells(row: &CityRow) -> [String; 4] {
  [
    row.nom_ville.clone(),
    row.nombre_habitants.to_string(),
    row.code_departement.clone(),
    row.nom_departement.clone().unwrap_or_default(),
  ]
}

/// Rows that fit below the header on a page whose table starts at `top`.
fn rows_per_page(top: f32) -> usize {
  (((top - TABLE_BOTTOM) / ROW_HEIGHT) as usize).saturating_sub(1).max(1)
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Render a titled table of `rows` and write the document into `sink`.
pub fn write_pdf<W: Write>(title: &str, rows: &[CityRow], mut sink: W) -> Result<()> {
  sink.write_all(&build(title, rows))?;
  sink.flush()?;
  Ok(())
}

pub fn render_pdf(title: &str, rows: &[CityRow]) -> Result<Vec<u8>> {
  let mut buf = Vec::new();
  write_pdf(title, rows, &mut buf)?;
  Ok(buf)
}

fn build(title: &str, rows: &[CityRow]) -> Vec<u8> {
  let pages = paginate(rows.len());
  let page_count = pages.len();

  let mut doc = Document::new();
  doc.object(format!(
    "<< /Type /Catalog /Pages {} 0 R >>",
    Document::PAGES_ID
  ));
  let kids = (0..page_count)
    .map(|i| format!("{} 0 R", Document::first_page_id(i)))
    .collect::<Vec<_>>()
    .join(" ");
  doc.object(format!(
    "<< /Type /Pages /Kids [{kids}] /Count {page_count} \
     /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] >>"
  ));
  doc.object(font_dict("Helvetica"));
  doc.object(font_dict("Helvetica-Bold"));

  for (index, range) in pages.into_iter().enumerate() {
    let mut canvas = Canvas::default();
    let mut top = TABLE_TOP;
    if index == 0 {
      canvas.centered(Font::Bold, TITLE_SIZE, TITLE_BASELINE, title);
      top = TABLE_TOP_FIRST;
    }

    let header = COLUMNS.map(|c| c.title.to_owned());
    canvas.row(top, &header, Some(HEADER_GRAY), Font::Bold);
    for (i, row) in rows[range].iter().enumerate() {
      let y = top - ROW_HEIGHT * (i as f32 + 1.0);
      canvas.row(y, &cells(row), None, Font::Regular);
    }
    canvas.centered(
      Font::Regular,
      8.0,
      MARGIN / 2.0,
      &format!("Page {} / {page_count}", index + 1),
    );

    let content = canvas.finish();
    let content_id = Document::first_page_id(index) + 1;
    doc.object(format!(
      "<< /Type /Page /Parent {} 0 R /Resources << /Font << /F1 {} 0 R /F2 {} \
       0 R >> >> /Contents {content_id} 0 R >>",
      Document::PAGES_ID,
      Document::REGULAR_ID,
      Document::BOLD_ID,
    ));
    doc.object(format!(
      "<< /Length {} >>\nstream\n{content}\nendstream",
      content.len()
    ));
  }

  doc.finish(Document::CATALOG_ID)
}

/// Split `len` rows into per-page ranges. An empty table still gets a page.
fn paginate(len: usize) -> Vec<std::ops::Range<usize>> {
  let mut pages = Vec::new();
  let mut start = 0;
  let mut capacity = rows_per_page(TABLE_TOP_FIRST);
  loop {
    let end = (start + capacity).min(len);
    pages.push(start..end);
    if end >= len {
      return pages;
    }
    start = end;
    capacity = rows_per_page(TABLE_TOP);
  }
}

fn font_dict(base: &str) -> String {
  format!(
    "<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding \
     /WinAnsiEncoding >>"
  )
}

// ─── Document ────────────────────────────────────────────────────────────────

/// Object ids are assigned in write order, starting at 1.
struct Document {
  buf:     Vec<u8>,
  offsets: Vec<usize>,
}

impl Document {
  const CATALOG_ID: usize = 1;
  const PAGES_ID: usize = 2;
  const REGULAR_ID: usize = 3;
  const BOLD_ID: usize = 4;

  /// Each page is a page object followed by its content stream.
  fn first_page_id(index: usize) -> usize { 5 + 2 * index }

  fn new() -> Self {
    let mut buf = b"%PDF-1.4\n".to_vec();
    // Binary marker so transfer tools treat the file as binary.
    buf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
    Self { buf, offsets: Vec::new() }
  }

  fn object(&mut self, body: String) {
    self.offsets.push(self.buf.len());
    let id = self.offsets.len();
    self
      .buf
      .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
  }

  fn finish(mut self, root: usize) -> Vec<u8> {
    let xref = self.buf.len();
    let size = self.offsets.len() + 1;
    let mut table = format!("xref\n0 {size}\n0000000000 65535 f \n");
    for offset in &self.offsets {
      table.push_str(&format!("{offset:010} 00000 n \n"));
    }
    table.push_str(&format!(
      "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
    ));
    self.buf.extend_from_slice(table.as_bytes());
    self.buf
  }
}

// ─── Canvas ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Font {
  Regular,
  Bold,
}

impl Font {
  fn resource(self) -> &'static str {
    match self {
      Font::Regular => "F1",
      Font::Bold => "F2",
    }
  }
}

/// Accumulates the content stream of one page.
#[derive(Default)]
struct Canvas {
  ops: String,
}

impl Canvas {
  fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
    self.ops.push_str(&format!(
      "BT /{} {size:.1} Tf {x:.2} {y:.2} Td ({}) Tj ET\n",
      font.resource(),
      escape(text)
    ));
  }

  fn centered(&mut self, font: Font, size: f32, y: f32, text: &str) {
    let x = (PAGE_WIDTH - text_width(font, size, text)) / 2.0;
    self.text(font, size, x.max(MARGIN), y, text);
  }

  /// Draw one table row whose top edge is at `top`.
  fn row(&mut self, top: f32, values: &[String; 4], fill: Option<f32>, font: Font) {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    let bottom = top - ROW_HEIGHT;
    let baseline = bottom + (ROW_HEIGHT - CELL_SIZE) / 2.0 + 2.0;

    let mut x = MARGIN;
    for (column, value) in COLUMNS.iter().zip(values) {
      let width = usable * column.ratio;
      if let Some(gray) = fill {
        self.ops.push_str(&format!(
          "{gray:.2} g {x:.2} {bottom:.2} {width:.2} {ROW_HEIGHT:.2} re f 0 g\n"
        ));
      }
      self.ops.push_str(&format!(
        "0.5 w {x:.2} {bottom:.2} {width:.2} {ROW_HEIGHT:.2} re S\n"
      ));

      let room = width - 2.0 * CELL_PADDING;
      let text = truncate(font, CELL_SIZE, value, room);
      let text_x = match column.align {
        Align::Left => x + CELL_PADDING,
        Align::Right => {
          x + width - CELL_PADDING - text_width(font, CELL_SIZE, &text)
        }
      };
      self.text(font, CELL_SIZE, text_x, baseline, &text);
      x += width;
    }
  }

  fn finish(self) -> String { self.ops }
}

/// Shorten `text` with a trailing ellipsis until it fits in `room` points.
fn truncate(font: Font, size: f32, text: &str, room: f32) -> String {
  if text_width(font, size, text) <= room {
    return text.to_owned();
  }
  let mut chars: Vec<char> = text.chars().collect();
  while !chars.is_empty() {
    chars.pop();
    let candidate: String = chars.iter().chain(['…'].iter()).collect();
    if text_width(font, size, &candidate) <= room {
      return candidate;
    }
  }
  String::new()
}

// ─── Encoding ────────────────────────────────────────────────────────────────

/// Map a character to its `WinAnsiEncoding` byte.
fn win_ansi(c: char) -> u8 {
  match c {
    ' '..='~' => c as u8,
    '\u{A0}'..='\u{FF}' => c as u32 as u8,
    '€' => 0x80,
    '‚' => 0x82,
    '„' => 0x84,
    '…' => 0x85,
    '‹' => 0x8B,
    'Œ' => 0x8C,
    '‘' => 0x91,
    '’' => 0x92,
    '“' => 0x93,
    '”' => 0x94,
    '•' => 0x95,
    '–' => 0x96,
    '—' => 0x97,
    '›' => 0x9B,
    'œ' => 0x9C,
    'Ÿ' => 0x9F,
    _ => b'?',
  }
}

/// Encode `text` as the body of a PDF literal string, keeping the content
/// stream ASCII.
fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for byte in text.chars().map(win_ansi) {
    match byte {
      b'(' | b')' | b'\\' => {
        out.push('\\');
        out.push(byte as char);
      }
      0x20..=0x7E => out.push(byte as char),
      _ => out.push_str(&format!("\\{byte:03o}")),
    }
  }
  out
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// Advance widths (1/1000 em) of printable ASCII, from the Adobe core font
/// metrics.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
  278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
  556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
  1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
  667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
  333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
  556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
  278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
  556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
  975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
  667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
  333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
  611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Accented letters are as wide as their base letter in Helvetica.
fn base_letter(c: char) -> char {
  match c {
    'à' | 'â' | 'ä' | 'á' | 'ã' | 'å' => 'a',
    'À' | 'Â' | 'Ä' | 'Á' | 'Ã' | 'Å' => 'A',
    'é' | 'è' | 'ê' | 'ë' => 'e',
    'É' | 'È' | 'Ê' | 'Ë' => 'E',
    'î' | 'ï' | 'í' | 'ì' => 'i',
    'Î' | 'Ï' | 'Í' | 'Ì' => 'I',
    'ô' | 'ö' | 'ó' | 'ò' | 'õ' => 'o',
    'Ô' | 'Ö' | 'Ó' | 'Ò' | 'Õ' => 'O',
    'ù' | 'û' | 'ü' | 'ú' => 'u',
    'Ù' | 'Û' | 'Ü' | 'Ú' => 'U',
    'ç' => 'c',
    'Ç' => 'C',
    'ÿ' => 'y',
    'Ÿ' => 'Y',
    'ñ' => 'n',
    'Ñ' => 'N',
    '’' | '‘' => '\'',
    other => other,
  }
}

fn glyph_width(font: Font, c: char) -> u16 {
  let table = match font {
    Font::Regular => &HELVETICA,
    Font::Bold => &HELVETICA_BOLD,
  };
  match base_letter(c) {
    'Œ' => 1000,
    'œ' => 944,
    '…' | '—' => 1000,
    c @ ' '..='~' => table[c as usize - 0x20],
    _ => 556,
  }
}

fn text_width(font: Font, size: f32, text: &str) -> f32 {
  let units: u32 = text.chars().map(|c| u32::from(glyph_width(font, c))).sum();
  units as f32 * size / 1000.0
}
