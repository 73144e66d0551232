//! Line packing for the textual page report.

pub const POPUP_START: &str = "--- Popup Window Detected ---";
pub const POPUP_END: &str = "--- End of Popup ---";

const SHORT_ITEM: usize = 30;
const LINE_WIDTH: usize = 80;

/// One item of the flattened content stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    /// `[id][type]text`; `redundant` when the text is just the type label.
    Element { token: String, redundant: bool },
    Text(String),
    PopupStart,
    PopupEnd,
}

/// Pack a content stream into report lines.
///
/// Element tokens always start a line, sentinels stand alone, and short
/// text items are appended to the current line while it stays narrow.
pub fn pack(items: &[ContentItem]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for item in items {
        match item {
            ContentItem::Element {
                redundant: true, ..
            } => {}
            ContentItem::Element { token, .. } => {
                flush(&mut current, &mut lines);
                current = token.clone();
            }
            ContentItem::PopupStart => {
                flush(&mut current, &mut lines);
                lines.push(POPUP_START.to_string());
            }
            ContentItem::PopupEnd => {
                flush(&mut current, &mut lines);
                lines.push(POPUP_END.to_string());
            }
            ContentItem::Text(text) => {
                let text_len = text.chars().count();
                let line_len = current.chars().count();
                if current.is_empty() {
                    current = text.clone();
                } else if text_len < SHORT_ITEM && line_len + text_len + 1 < LINE_WIDTH {
                    current.push(' ');
                    current.push_str(text);
                } else {
                    flush(&mut current, &mut lines);
                    current = text.clone();
                }
            }
        }
    }
    flush(&mut current, &mut lines);
    lines
}

fn flush(current: &mut String, lines: &mut Vec<String>) {
    if !current.is_empty() {
        lines.push(std::mem::take(current));
    }
}
