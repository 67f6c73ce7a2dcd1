use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, WINDOWS_1256};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::bidi::contains_rtl;
use crate::error::ConvertError;
use crate::model::PageText;
use crate::options::PageSelection;
use crate::table_parse::line_cells;

const PAGE_BREAK: char = '\u{000C}';
/// Below this score the first page also considers the unsplit document text.
const WEAK_PAGE_SCORE: i64 = 80;
const EMPTY_SCORE: i64 = i64::MIN / 4;
/// A negative kerning offset this wide is rendered as a word gap.
const KERNING_GAP: i64 = -100;

/// Where a page text candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextSource {
    PdfExtractPage,
    ContentStream,
    LopdfPage,
    PdfExtractDocument,
}

#[derive(Debug)]
struct TextCandidate {
    source: TextSource,
    text: String,
    score: i64,
}

impl TextCandidate {
    fn new(source: TextSource, text: String) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        let score = table_likeness(&text);
        Some(Self {
            source,
            text,
            score,
        })
    }
}

/// pdf-extract separates pages with form feeds; a trailing one leaves an empty tail.
fn pages_from_extracted(text: &str) -> Vec<&str> {
    let mut pages = text.split(PAGE_BREAK).collect::<Vec<_>>();
    if pages.last().is_some_and(|page| page.is_empty()) {
        pages.pop();
    }
    pages
}

fn is_garbled(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let mut total = 0_usize;
    let mut replacement = 0_usize;
    let mut control = 0_usize;
    for ch in text.chars() {
        total += 1;
        if ch == '\u{FFFD}' {
            replacement += 1;
        } else if ch.is_control() && !matches!(ch, '\n' | '\r' | '\t') {
            control += 1;
        }
    }

    total > 0 && (replacement * 8 > total || control * 5 > total)
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    (!had_errors && !text.is_empty()).then(|| text.into_owned())
}

fn is_two_byte_font_encoding(name: &str) -> bool {
    ["utf16", "ucs2", "identity-h", "unicode"]
        .iter()
        .any(|marker| name.contains(marker))
}

fn is_arabic_code_page(name: &str) -> bool {
    name.contains("1256") || name.contains("arabic")
}

/// Decodes a PDF string operand, trying Persian-friendly encodings when lopdf's guess is garbled.
fn decode_string_operand(font_encoding: Option<&str>, bytes: &[u8]) -> String {
    let with_bom = match bytes {
        [0xFE, 0xFF, rest @ ..] => decode_strict(UTF_16BE, rest),
        [0xFF, 0xFE, rest @ ..] => decode_strict(UTF_16LE, rest),
        _ => None,
    };
    if let Some(text) = with_bom {
        return text;
    }

    let guessed = Document::decode_text(font_encoding, bytes);
    if !is_garbled(&guessed) {
        return guessed;
    }

    let hint = font_encoding.map(str::to_ascii_lowercase).unwrap_or_default();
    let fallback = if is_two_byte_font_encoding(&hint) {
        decode_strict(UTF_16BE, bytes)
    } else if is_arabic_code_page(&hint) {
        decode_strict(WINDOWS_1256, bytes)
    } else {
        None
    };

    fallback.unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
}

/// Higher means more likely to hold the page's tables in a splittable form.
fn table_likeness(text: &str) -> i64 {
    let mut lines = 0_i64;
    let mut tabular = 0_i64;
    let mut script = 0_i64;
    let mut dated = 0_i64;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        lines += 1;
        if line_cells(line, 2).len() >= 2 {
            tabular += 1;
        }
        if contains_rtl(line) {
            script += 1;
        }
        if line.contains('/') && line.chars().any(char::is_numeric) {
            dated += 1;
        }
    }

    if lines == 0 {
        return EMPTY_SCORE;
    }
    let garbled_penalty = if is_garbled(text) { 800 } else { 0 };
    tabular * 50 + dated * 15 + script * 5 + lines - garbled_penalty
}

/// Rebuilds text lines from a page's content stream, decoding each string with its font's encoding.
struct ContentLines<'a> {
    font_encodings: BTreeMap<Vec<u8>, &'a str>,
    active_encoding: Option<&'a str>,
    lines: Vec<String>,
    line: String,
}

impl<'a> ContentLines<'a> {
    fn new(font_encodings: BTreeMap<Vec<u8>, &'a str>) -> Self {
        Self {
            font_encodings,
            active_encoding: None,
            lines: Vec::new(),
            line: String::new(),
        }
    }

    fn push_operands(&mut self, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => {
                    let text = decode_string_operand(self.active_encoding, bytes);
                    self.line.push_str(&text);
                }
                Object::Array(items) => {
                    self.push_operands(items);
                    self.line.push(' ');
                }
                Object::Integer(offset) if *offset < KERNING_GAP => self.line.push(' '),
                _ => {}
            }
        }
    }

    fn end_line(&mut self) {
        if self.line.trim().is_empty() {
            self.line.clear();
        } else {
            self.lines.push(std::mem::take(&mut self.line));
        }
    }

    fn apply(&mut self, operation: &Operation) {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(font) = operation.operands.first().and_then(|op| op.as_name().ok()) {
                    self.active_encoding = self.font_encodings.get(font).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => self.push_operands(&operation.operands),
            "T*" | "Td" | "TD" | "ET" => self.end_line(),
            _ => {}
        }
    }

    fn finish(mut self) -> Option<String> {
        self.end_line();
        (!self.lines.is_empty()).then(|| self.lines.join("\n"))
    }
}

fn content_stream_text(document: &Document, page_id: ObjectId) -> Option<String> {
    let raw = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw).ok()?;
    let font_encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();

    let mut collector = ContentLines::new(font_encodings);
    for operation in &content.operations {
        collector.apply(operation);
    }
    collector.finish()
}

fn best_candidate(candidates: Vec<TextCandidate>) -> Option<TextCandidate> {
    candidates.into_iter().max_by_key(|candidate| candidate.score)
}

/// Reads the text of every selected page, keeping the most table-like extraction.
///
/// `extracted` is pdf-extract's text for the whole document when it could be produced.
fn read_pages(
    document: &Document,
    extracted: Option<&str>,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageText>, ConvertError> {
    let page_ids = document.get_pages();
    let extracted_pages = extracted.map(pages_from_extracted);
    // Page-aligned only when pdf-extract produced one chunk per page.
    let aligned = extracted_pages
        .as_ref()
        .filter(|pages| pages.len() == page_ids.len());

    let mut pages = Vec::new();
    for (position, (&page_number, &page_id)) in page_ids.iter().enumerate() {
        if page_selection.is_some_and(|selection| !selection.contains(page_number)) {
            continue;
        }

        let mut candidates = [
            aligned
                .and_then(|texts| texts.get(position))
                .and_then(|text| {
                    TextCandidate::new(TextSource::PdfExtractPage, (*text).to_string())
                }),
            content_stream_text(document, page_id)
                .and_then(|text| TextCandidate::new(TextSource::ContentStream, text)),
            document
                .extract_text(&[page_number])
                .ok()
                .and_then(|text| TextCandidate::new(TextSource::LopdfPage, text)),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

        let strongest = candidates.iter().map(|c| c.score).max().unwrap_or(EMPTY_SCORE);
        if position == 0
            && aligned.is_none()
            && strongest < WEAK_PAGE_SCORE
            && let Some(candidate) = extracted.and_then(|text| {
                TextCandidate::new(TextSource::PdfExtractDocument, text.to_string())
            })
        {
            candidates.push(candidate);
        }

        let count = candidates.len();
        let text = match best_candidate(candidates) {
            Some(best) => {
                debug!(
                    page = page_number,
                    candidates = count,
                    source = ?best.source,
                    score = best.score,
                    "selected page text"
                );
                best.text
            }
            None => {
                debug!(page = page_number, "page has no extractable text");
                String::new()
            }
        };
        pages.push(PageText { page_number, text });
    }

    if pages.is_empty() {
        return Err(ConvertError::NoPagesSelected);
    }
    Ok(pages)
}

pub(crate) fn read_pdf_pages(
    input_pdf: &Path,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageText>, ConvertError> {
    let document = Document::load(input_pdf)?;
    let extracted = pdf_extract::extract_text(input_pdf).ok();
    read_pages(&document, extracted.as_deref(), page_selection)
}

pub(crate) fn read_pdf_pages_from_bytes(
    input_pdf: &[u8],
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageText>, ConvertError> {
    let document = Document::load_mem(input_pdf)?;
    let extracted = pdf_extract::extract_text_from_mem(input_pdf).ok();
    read_pages(&document, extracted.as_deref(), page_selection)
}
