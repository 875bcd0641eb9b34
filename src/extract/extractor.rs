use crate::extract::{ExtractedContent, SegmentKind};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

lazy_static! {
    static ref LIST_ITEM: Selector = Selector::parse("li").expect("static selector");
    static ref TABLE_ROW: Selector = Selector::parse("tr").expect("static selector");
    static ref TABLE_CELL: Selector = Selector::parse("th, td").expect("static selector");
}

pub const DEFAULT_HEADING_TAGS: [&str; 2] = ["h2", "h3"];

/// Parses raw markup. Invalid UTF-8 is replaced rather than rejected.
fn parse_document(bytes: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(bytes))
}

#[derive(Debug, Clone)]
pub struct ContentExtractor {
    heading_tags: HashSet<String>,
}

impl ContentExtractor {
    pub fn new<I, S>(heading_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            heading_tags: heading_tags
                .into_iter()
                .map(|t| t.as_ref().trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn extract_bytes(&self, bytes: &[u8]) -> ExtractedContent {
        self.extract(&parse_document(bytes))
    }

    /// Walks every element in document order and keeps the first occurrence
    /// of each heading, paragraph, list block and table block. Never fails.
    pub fn extract(&self, document: &Html) -> ExtractedContent {
        let mut content = ExtractedContent::new();
        for node in document.root_element().descendants() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            let Some((kind, text)) = self.classify(element) else {
                continue;
            };
            if !text.is_empty() {
                content.push(kind, text);
            }
        }
        content
    }

    fn classify(&self, element: ElementRef) -> Option<(SegmentKind, String)> {
        let name = element.value().name();
        if self.heading_tags.contains(name) {
            return Some((SegmentKind::Heading, element_text(element)));
        }
        match name {
            "p" => Some((SegmentKind::Paragraph, element_text(element))),
            "ul" | "ol" => Some((SegmentKind::List, list_text(element))),
            "table" => Some((SegmentKind::Table, table_text(element))),
            _ => None,
        }
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_HEADING_TAGS)
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn list_text(element: ElementRef) -> String {
    element
        .select(&LIST_ITEM)
        .map(element_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn table_text(element: ElementRef) -> String {
    element
        .select(&TABLE_ROW)
        .map(|row| {
            row.select(&TABLE_CELL)
                .map(element_text)
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::ContentExtractor;
    use crate::extract::SegmentKind;

    fn extract(html: &str) -> crate::extract::ExtractedContent {
        ContentExtractor::default().extract_bytes(html.as_bytes())
    }

    #[test]
    fn test_duplicate_paragraphs_are_dropped_in_order() {
        let content = extract(
            r#"<html><body>
            <p>First</p>
            <p>Second</p>
            <p>  First  </p>
            <p>Third</p>
            <p>Second</p>
            </body></html>"#,
        );
        assert_eq!(
            content.texts_of(SegmentKind::Paragraph),
            vec!["First", "Second", "Third"]
        );
    }

    #[test]
    fn test_heading_and_paragraph_with_same_text_both_survive() {
        let content = extract("<h2>Refunds</h2><p>Refunds</p>");
        assert_eq!(content.len(), 2);
        assert_eq!(content.texts_of(SegmentKind::Heading), vec!["Refunds"]);
        assert_eq!(content.texts_of(SegmentKind::Paragraph), vec!["Refunds"]);
    }

    #[test]
    fn test_segments_keep_document_order_across_kinds() {
        let content = extract(
            r#"<h2>Terms</h2><p>Intro</p><ul><li>a</li><li>b</li></ul><h3>Fees</h3><p>Details</p>"#,
        );
        let texts: Vec<&str> = content.segments().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Terms", "Intro", "a\nb", "Fees", "Details"]);
    }

    #[test]
    fn test_lists_collapse_into_one_block() {
        let content = extract(
            r#"<ul><li> one </li><li>two</li></ul>
               <ol><li>one</li><li>two</li></ol>
               <ul><li>one</li><li>two</li></ul>"#,
        );
        assert_eq!(content.texts_of(SegmentKind::List), vec!["one\ntwo"]);
    }

    #[test]
    fn test_tables_collapse_rows_and_cells() {
        let content = extract(
            r#"<table>
                 <tr><th>Plan</th><th>Fee</th></tr>
                 <tr><td>Basic</td><td> $5 </td></tr>
               </table>"#,
        );
        assert_eq!(
            content.texts_of(SegmentKind::Table),
            vec!["Plan\tFee\nBasic\t$5"]
        );
    }

    #[test]
    fn test_default_headings_are_h2_and_h3() {
        let content = extract("<h1>Title</h1><h2>Section</h2><h3>Sub</h3><h4>Minor</h4>");
        assert_eq!(content.texts_of(SegmentKind::Heading), vec!["Section", "Sub"]);
    }

    #[test]
    fn test_custom_heading_tags() {
        let extractor = ContentExtractor::new(["H1", "h4"]);
        let content = extractor.extract_bytes(b"<h1>Title</h1><h2>Section</h2><h4>Minor</h4>");
        assert_eq!(content.texts_of(SegmentKind::Heading), vec!["Title", "Minor"]);
    }

    #[test]
    fn test_empty_and_malformed_documents_yield_nothing() {
        assert!(extract("").is_empty());
        assert!(extract("<div><span>no blocks here</span></div>").is_empty());
        assert!(extract("<p>   </p><ul></ul>").is_empty());
        assert!(ContentExtractor::default()
            .extract_bytes(&[0xff, 0xfe, 0x00])
            .is_empty());
    }

    #[test]
    fn test_unclosed_markup_still_extracts() {
        let content = extract("<p>Open paragraph<p>Another");
        assert_eq!(
            content.texts_of(SegmentKind::Paragraph),
            vec!["Open paragraph", "Another"]
        );
    }

    #[test]
    fn test_display_joins_with_blank_lines() {
        let content = extract("<h2>A</h2><p>B</p>");
        assert_eq!(content.to_string(), "A\n\nB");
    }
}
