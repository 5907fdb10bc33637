// ABOUTME: Text span extraction from PDF content streams via lopdf.
// ABOUTME: Tracks font size through Tf/Tm and splits lines on positioning operators.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::debug;

use crate::classify::{Line, PageText, TextSpan};
use crate::cmap::ToUnicodeMap;

/// Per-font decoding state resolved from the page's resource dictionary.
struct FontInfo<'a> {
    encoding: Option<Encoding<'a>>,
    to_unicode: Option<ToUnicodeMap>,
}

/// Extracts every page's lines, in page order. A page whose content cannot
/// be read contributes an empty page instead of failing the document.
pub fn extract_pages(doc: &Document) -> Vec<PageText> {
    doc.get_pages()
        .into_iter()
        .map(|(number, page_id)| match extract_page(doc, page_id) {
            Ok(page) => page,
            Err(error) => {
                debug!(page = number, %error, "skipping unreadable page content");
                PageText::default()
            }
        })
        .collect()
}

/// Line splitting is conservative: any text-positioning operator starts a new
/// line. Over-splitting one visual row is tolerable because heading
/// candidates are re-joined per page downstream.
fn extract_page(doc: &Document, page_id: ObjectId) -> Result<PageText, lopdf::Error> {
    let fonts = load_fonts(doc, page_id);
    let data = doc.get_page_content(page_id)?;
    let content = Content::decode(&data)?;

    let mut page = PageText::default();
    let mut line = Line::default();
    let mut current_font: Option<&FontInfo<'_>> = None;
    let mut nominal_size = 0.0f32;
    let mut scale = 1.0f32;

    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(name) = operation
                    .operands
                    .first()
                    .and_then(|object| object.as_name_str().ok())
                {
                    current_font = fonts.get(name);
                }
                if let Some(size) = operand_f32(&operation.operands, 1) {
                    nominal_size = size;
                }
            }
            "Tm" => {
                // |d| carries the vertical scaling applied to the nominal size
                if let Some(d) = operand_f32(&operation.operands, 3) {
                    scale = d.abs().max(f32::EPSILON);
                }
                break_line(&mut page, &mut line);
            }
            "Td" | "TD" => {
                if operand_f32(&operation.operands, 1).map_or(true, |dy| dy != 0.0) {
                    break_line(&mut page, &mut line);
                }
            }
            "T*" | "BT" | "ET" => break_line(&mut page, &mut line),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operation.operands.first() {
                    push_span(&mut line, decode_bytes(current_font, bytes), nominal_size * scale);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operation.operands.first() {
                    let mut text = String::new();
                    for item in items {
                        if let Object::String(bytes, _) = item {
                            text.push_str(&decode_bytes(current_font, bytes));
                        }
                    }
                    push_span(&mut line, text, nominal_size * scale);
                }
            }
            "'" => {
                break_line(&mut page, &mut line);
                if let Some(Object::String(bytes, _)) = operation.operands.first() {
                    push_span(&mut line, decode_bytes(current_font, bytes), nominal_size * scale);
                }
            }
            "\"" => {
                break_line(&mut page, &mut line);
                if let Some(Object::String(bytes, _)) = operation.operands.get(2) {
                    push_span(&mut line, decode_bytes(current_font, bytes), nominal_size * scale);
                }
            }
            _ => {}
        }
    }
    break_line(&mut page, &mut line);

    Ok(page)
}

fn load_fonts(doc: &Document, page_id: ObjectId) -> HashMap<String, FontInfo<'_>> {
    let mut fonts = HashMap::new();

    let Ok(page_fonts) = doc.get_page_fonts(page_id) else {
        return fonts;
    };
    for (name, font) in page_fonts {
        let encoding = font.get_font_encoding(doc).ok();
        let to_unicode = font
            .get(b"ToUnicode")
            .ok()
            .and_then(|object| to_unicode_stream(doc, object))
            .map(|data| ToUnicodeMap::parse(&data))
            .filter(|map| !map.is_empty());

        fonts.insert(
            String::from_utf8_lossy(&name).to_string(),
            FontInfo {
                encoding,
                to_unicode,
            },
        );
    }
    fonts
}

fn to_unicode_stream(doc: &Document, object: &Object) -> Option<Vec<u8>> {
    let stream = match object {
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Stream(stream) => stream,
            _ => return None,
        },
        Object::Stream(stream) => stream,
        _ => return None,
    };
    Some(
        stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone()),
    )
}

fn decode_bytes(font: Option<&FontInfo>, bytes: &[u8]) -> String {
    if let Some(info) = font {
        if let Some(map) = &info.to_unicode {
            return map.decode(bytes);
        }
        if let Some(encoding) = &info.encoding {
            if let Ok(text) = Document::decode_text(encoding, bytes) {
                return text;
            }
        }
    }
    String::from_utf8_lossy(bytes).to_string()
}

fn operand_f32(operands: &[Object], index: usize) -> Option<f32> {
    match operands.get(index)? {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn push_span(line: &mut Line, text: String, size: f32) {
    if text.is_empty() {
        return;
    }
    line.spans.push(TextSpan { text, size });
}

fn break_line(page: &mut PageText, line: &mut Line) {
    if !line.spans.is_empty() {
        page.lines.push(std::mem::take(line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream};
    use pretty_assertions::assert_eq;

    /// One-page document built the way lopdf's own examples do it.
    fn one_page_doc(operations: Vec<Operation>) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn text_ops(size: i64, text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), size.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    #[test]
    fn test_extracts_span_with_font_size() {
        let doc = one_page_doc(text_ops(48, "Big Heading"));
        let pages = extract_pages(&doc);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines.len(), 1);
        assert_eq!(pages[0].lines[0].spans[0].text, "Big Heading");
        assert_eq!(pages[0].lines[0].spans[0].size, 48.0);
    }

    #[test]
    fn test_td_with_vertical_move_breaks_lines() {
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal("first")]),
            Operation::new("Td", vec![0.into(), (-14).into()]),
            Operation::new("Tj", vec![Object::string_literal("second")]),
            Operation::new("ET", vec![]),
        ];
        // a purely horizontal move keeps the line open
        ops.insert(6, Operation::new("Td", vec![50.into(), 0.into()]));
        ops.insert(7, Operation::new("Tj", vec![Object::string_literal(" more")]));

        let doc = one_page_doc(ops);
        let pages = extract_pages(&doc);

        assert_eq!(pages[0].lines.len(), 2);
        assert_eq!(pages[0].lines[0].spans[0].text, "first");
        assert_eq!(pages[0].lines[1].spans.len(), 2);
        assert_eq!(pages[0].lines[1].spans[0].text, "second");
        assert_eq!(pages[0].lines[1].spans[1].text, " more");
    }

    #[test]
    fn test_tm_scales_nominal_size() {
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new(
                "Tm",
                vec![4.into(), 0.into(), 0.into(), 4.into(), 100.into(), 700.into()],
            ),
            Operation::new("Tj", vec![Object::string_literal("scaled")]),
            Operation::new("ET", vec![]),
        ];
        let doc = one_page_doc(ops);
        let pages = extract_pages(&doc);

        assert_eq!(pages[0].lines[0].spans[0].size, 48.0);
    }

    #[test]
    fn test_tj_array_concatenates() {
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 14.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Hel"),
                    Object::Integer(-20),
                    Object::string_literal("lo"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ];
        let doc = one_page_doc(ops);
        let pages = extract_pages(&doc);

        assert_eq!(pages[0].lines[0].spans[0].text, "Hello");
    }

    #[test]
    fn test_page_without_text_is_empty() {
        let doc = one_page_doc(vec![]);
        let pages = extract_pages(&doc);

        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }
}
