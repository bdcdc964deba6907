//! Markdown to PDF conversion for the generated reports.
//!
//! Only the subset of markdown the report renderer emits is understood:
//! `#`/`##`/`###` headings, `---` rules, `- ` bullets and `  - ` sub-bullets,
//! `**bold**`, `*italic*`, whole-line italics and `[text](url)` links. Text is
//! set in the standard Helvetica faces with WinAnsi encoding, so no fonts are
//! embedded; widths are approximated from the Helvetica metrics.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RenderError;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;

const BODY_SIZE: f32 = 11.0;
const BODY_LEADING: f32 = 16.0;
const BULLET_INDENT: f32 = 18.0;
const BULLET_GAP: f32 = 12.0;

type Rgb = (f32, f32, f32);

const fn hex(rgb: u32) -> Rgb {
    (
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

const TITLE_COLOR: Rgb = hex(0x2c3e50);
const H2_COLOR: Rgb = hex(0x34495e);
const H3_COLOR: Rgb = hex(0x555555);
const BODY_COLOR: Rgb = hex(0x333333);
const LINK_COLOR: Rgb = hex(0x3498db);
const RULE_COLOR: Rgb = hex(0xe0e0e0);

static INLINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*(.+?)\*\*|\[([^\]]+)\]\(([^)\s]+)\)|\*([^*]+?)\*").unwrap()
});

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Heading { level: u8, text: String },
    Rule,
    Bullet { depth: u8, text: String },
    Italic(String),
    Paragraph(String),
    Spacer,
}

fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for line in markdown.lines() {
        let trimmed = line.trim();
        let block = if trimmed.is_empty() {
            if matches!(blocks.last(), Some(Block::Spacer) | None) {
                continue;
            }
            Block::Spacer
        } else if let Some(text) = line.strip_prefix("### ") {
            Block::Heading { level: 3, text: text.trim().to_string() }
        } else if let Some(text) = line.strip_prefix("## ") {
            Block::Heading { level: 2, text: text.trim().to_string() }
        } else if let Some(text) = line.strip_prefix("# ") {
            Block::Heading { level: 1, text: text.trim().to_string() }
        } else if trimmed == "---" {
            Block::Rule
        } else if let Some(text) = line.strip_prefix("  - ") {
            Block::Bullet { depth: 2, text: text.trim().to_string() }
        } else if let Some(text) = line.strip_prefix("- ") {
            Block::Bullet { depth: 1, text: text.trim().to_string() }
        } else if is_italic_line(trimmed) {
            Block::Italic(trimmed[1..trimmed.len() - 1].to_string())
        } else {
            Block::Paragraph(trimmed.to_string())
        };
        blocks.push(block);
    }
    blocks
}

fn is_italic_line(line: &str) -> bool {
    line.len() > 2
        && line.starts_with('*')
        && line.ends_with('*')
        && !line.starts_with("**")
        && !line[1..line.len() - 1].contains('*')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Style {
    bold: bool,
    italic: bool,
}

impl Style {
    fn font(self) -> &'static str {
        match (self.bold, self.italic) {
            (false, false) => "F1",
            (true, false) => "F2",
            (false, true) => "F3",
            (true, true) => "F4",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Span {
    text: String,
    style: Style,
    link: Option<String>,
}

impl Span {
    fn plain(text: &str, style: Style) -> Span {
        Span {
            text: text.to_string(),
            style,
            link: None,
        }
    }
}

fn parse_inline(text: &str, base: Style) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in INLINE_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Span::plain(&text[last..whole.start()], base));
        }
        if let Some(bold) = caps.get(1) {
            spans.push(Span::plain(bold.as_str(), Style { bold: true, ..base }));
        } else if let (Some(label), Some(url)) = (caps.get(2), caps.get(3)) {
            spans.push(Span {
                text: label.as_str().to_string(),
                style: base,
                link: Some(url.as_str().to_string()),
            });
        } else if let Some(italic) = caps.get(4) {
            spans.push(Span::plain(italic.as_str(), Style { italic: true, ..base }));
        }
        last = whole.end();
    }
    if last < text.len() {
        spans.push(Span::plain(&text[last..], base));
    }
    spans
}

/// Approximate Helvetica advance widths, in thousandths of an em.
fn char_width(c: char) -> f32 {
    let units = match c {
        ' ' | 'i' | 'j' | 'l' | 'f' | 't' | 'I' | '.' | ',' | ':' | ';' | '!' | '\'' | '|'
        | '/' => 278,
        'r' | '-' | '(' | ')' | '[' | ']' | '"' | '*' => 333,
        'm' | 'M' => 833,
        'w' => 722,
        'W' => 944,
        c if c.is_ascii_uppercase() => 690,
        _ => 556,
    };
    units as f32
}

fn text_width(text: &str, size: f32, style: Style) -> f32 {
    let units: f32 = text.chars().map(char_width).sum();
    let scale = if style.bold { 1.06 } else { 1.0 };
    units * size * scale / 1000.0
}

/// Maps text onto WinAnsiEncoding; anything unrepresentable becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[derive(Debug, Clone)]
struct Word {
    text: String,
    style: Style,
    link: Option<String>,
    space_before: bool,
}

fn split_words(spans: &[Span]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pending_space = false;
    for span in spans {
        let mut current = String::new();
        for c in span.text.chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    words.push(Word {
                        text: std::mem::take(&mut current),
                        style: span.style,
                        link: span.link.clone(),
                        space_before: pending_space,
                    });
                }
                pending_space = true;
            } else {
                current.push(c);
            }
        }
        if !current.is_empty() {
            words.push(Word {
                text: current,
                style: span.style,
                link: span.link.clone(),
                space_before: pending_space,
            });
            pending_space = false;
        }
    }
    words
}

/// Splits a word wider than `max_width` into pieces that fit.
fn break_long_word(word: Word, size: f32, max_width: f32) -> Vec<Word> {
    if text_width(&word.text, size, word.style) <= max_width {
        return vec![word];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.text.chars() {
        current.push(c);
        if text_width(&current, size, word.style) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| Word {
            text,
            style: word.style,
            link: word.link.clone(),
            space_before: i == 0 && word.space_before,
        })
        .collect()
}

struct Placed {
    x: f32,
    width: f32,
    word: Word,
}

fn wrap_words(words: Vec<Word>, size: f32, max_width: f32) -> Vec<Vec<Placed>> {
    let space = text_width(" ", size, Style::default());
    let mut lines: Vec<Vec<Placed>> = Vec::new();
    let mut line: Vec<Placed> = Vec::new();
    let mut x = 0.0;
    for word in words
        .into_iter()
        .flat_map(|w| break_long_word(w, size, max_width))
    {
        let width = text_width(&word.text, size, word.style);
        let gap = if word.space_before && !line.is_empty() { space } else { 0.0 };
        if !line.is_empty() && x + gap + width > max_width {
            lines.push(std::mem::take(&mut line));
            x = 0.0;
        }
        let gap = if line.is_empty() { 0.0 } else { gap };
        line.push(Placed {
            x: x + gap,
            width,
            word,
        });
        x += gap + width;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

struct LinkArea {
    rect: [f32; 4],
    url: String,
}

#[derive(Default)]
struct Page {
    ops: Vec<Operation>,
    links: Vec<LinkArea>,
}

/// Cursor over pages; `y` is the top of the next line.
struct Layout {
    pages: Vec<Page>,
    y: f32,
}

impl Layout {
    fn new() -> Layout {
        Layout {
            pages: vec![Page::default()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn at_top(&self) -> bool {
        self.y >= PAGE_HEIGHT - MARGIN
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN && !self.at_top() {
            self.pages.push(Page::default());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn advance(&mut self, dy: f32) {
        if !self.at_top() {
            self.y -= dy;
        }
    }

    fn rule(&mut self, color: Rgb, width: f32) {
        let y = self.y;
        self.page().ops.extend([
            Operation::new("q", vec![]),
            Operation::new("RG", vec![color.0.into(), color.1.into(), color.2.into()]),
            Operation::new("w", vec![width.into()]),
            Operation::new("m", vec![MARGIN.into(), y.into()]),
            Operation::new("l", vec![(PAGE_WIDTH - MARGIN).into(), y.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self.y -= width;
    }

    fn text(&mut self, x: f32, baseline: f32, text: &str, size: f32, style: Style, color: Rgb) {
        self.page().ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![style.font().into(), size.into()]),
            Operation::new("rg", vec![color.0.into(), color.1.into(), color.2.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new("Tj", vec![Object::String(win_ansi(text), StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn link(&mut self, rect: [f32; 4], url: &str) {
        let page = self.page();
        if let Some(last) = page.links.last_mut() {
            if last.url == url && last.rect[1] == rect[1] && rect[0] - last.rect[2] < 6.0 {
                last.rect[2] = rect[2];
                return;
            }
        }
        page.links.push(LinkArea {
            rect,
            url: url.to_string(),
        });
    }

    /// Writes wrapped text starting at `left`; a bullet glyph hangs before the first line.
    fn paragraph(
        &mut self,
        spans: &[Span],
        left: f32,
        size: f32,
        leading: f32,
        color: Rgb,
        bullet: Option<&str>,
    ) {
        let text_left = if bullet.is_some() { left + BULLET_GAP } else { left };
        let max_width = PAGE_WIDTH - MARGIN - text_left;
        let lines = wrap_words(split_words(spans), size, max_width);
        for (i, line) in lines.iter().enumerate() {
            self.ensure_space(leading);
            let baseline = self.y - size;
            if i == 0 {
                if let Some(glyph) = bullet {
                    self.text(left, baseline, glyph, size, Style::default(), color);
                }
            }
            for placed in line {
                let x = text_left + placed.x;
                let (word_color, style) = match (&placed.word.link, placed.word.style.bold) {
                    (Some(_), _) => (LINK_COLOR, placed.word.style),
                    (None, true) if color == BODY_COLOR => (TITLE_COLOR, placed.word.style),
                    _ => (color, placed.word.style),
                };
                self.text(x, baseline, &placed.word.text, size, style, word_color);
                if let Some(url) = &placed.word.link {
                    self.link([x, baseline - 2.0, x + placed.width, baseline + size], url);
                }
            }
            self.y -= leading;
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, text } => {
                let (size, color, before, after) = match *level {
                    1 => (24.0, TITLE_COLOR, 0.0, 10.0),
                    2 => (18.0, H2_COLOR, 18.0, 8.0),
                    _ => (14.0, H3_COLOR, 12.0, 4.0),
                };
                let bold = Style { bold: true, italic: false };
                let spans: Vec<Span> = parse_inline(text, bold)
                    .into_iter()
                    .map(|span| Span { style: Style { bold: true, ..span.style }, ..span })
                    .collect();
                self.advance(before);
                self.ensure_space(size * 1.3 + after);
                self.paragraph(&spans, MARGIN, size, size * 1.3, color, None);
                match *level {
                    1 => {
                        self.y -= 4.0;
                        self.rule(LINK_COLOR, 3.0);
                    }
                    2 => {
                        self.y -= 4.0;
                        self.rule(RULE_COLOR, 1.5);
                    }
                    _ => {}
                }
                self.y -= after;
            }
            Block::Rule => {
                self.advance(12.0);
                self.ensure_space(14.0);
                self.rule(RULE_COLOR, 2.0);
                self.y -= 12.0;
            }
            Block::Bullet { depth, text } => {
                let (indent, glyph) = match *depth {
                    1 => (BULLET_INDENT, "•"),
                    _ => (BULLET_INDENT * 2.0, "-"),
                };
                let spans = parse_inline(text, Style::default());
                self.paragraph(&spans, MARGIN + indent, BODY_SIZE, BODY_LEADING, BODY_COLOR, Some(glyph));
            }
            Block::Italic(text) => {
                let italic = Style { bold: false, italic: true };
                let spans: Vec<Span> = parse_inline(text, italic)
                    .into_iter()
                    .map(|span| Span { style: Style { italic: true, ..span.style }, ..span })
                    .collect();
                self.paragraph(&spans, MARGIN, BODY_SIZE, BODY_LEADING, BODY_COLOR, None);
            }
            Block::Paragraph(text) => {
                let spans = parse_inline(text, Style::default());
                self.paragraph(&spans, MARGIN, BODY_SIZE, BODY_LEADING, BODY_COLOR, None);
            }
            Block::Spacer => self.advance(BODY_LEADING / 2.0),
        }
    }
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Lays out `markdown` and returns the finished document.
pub fn render_pdf(markdown: &str) -> Result<Document, RenderError> {
    let mut layout = Layout::new();
    for block in parse_blocks(markdown) {
        layout.block(&block);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let italic_id = doc.add_object(font("Helvetica-Oblique"));
    let bold_italic_id = doc.add_object(font("Helvetica-BoldOblique"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
            "F3" => italic_id,
            "F4" => bold_italic_id,
        },
    });

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in layout.pages {
        let content = Content {
            operations: page.ops,
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let annots: Vec<Object> = page
            .links
            .into_iter()
            .map(|link| {
                Object::Dictionary(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => link.rect.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
                    "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
                    "A" => dictionary! {
                        "Type" => "Action",
                        "S" => "URI",
                        "URI" => Object::string_literal(link.url),
                    },
                })
            })
            .collect();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Annots" => annots,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH),
            Object::Real(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}

pub fn render_pdf_bytes(markdown: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = render_pdf(markdown)?;
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Converts the markdown file at `md_path`; the PDF lands next to it unless
/// `pdf_path` is given. Returns the path written.
pub fn markdown_to_pdf(md_path: &Path, pdf_path: Option<&Path>) -> Result<PathBuf, RenderError> {
    let markdown = fs::read_to_string(md_path)?;
    let pdf_path = pdf_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| md_path.with_extension("pdf"));
    fs::write(&pdf_path, render_pdf_bytes(&markdown)?)?;
    tracing::info!("PDF generated: {}", pdf_path.display());
    Ok(pdf_path)
}
