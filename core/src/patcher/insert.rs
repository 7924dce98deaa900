use crate::patcher::anchor::InsertPoint;

/// Line terminator of the line ending at `offset`, or of the first line
/// when the anchor line has none.
fn line_ending(text: &str, offset: usize) -> &'static str {
    let head = &text[..offset];
    let crlf = if head.ends_with('\n') {
        head.ends_with("\r\n")
    } else {
        text.find('\n').is_some_and(|i| text[..i].ends_with('\r'))
    };
    if crlf {
        "\r\n"
    } else {
        "\n"
    }
}

/// Returns a new snapshot with `entry` inserted as its own line at `point`.
///
/// `point.offset` is the end of the anchor line. The new line ends the way
/// the anchor line does (`\n` or `\r\n`). If the anchor line was the last
/// line and had no terminator, one is added before the entry.
pub fn insert_line_after(text: &str, point: &InsertPoint, entry: &str) -> String {
    let eol = line_ending(text, point.offset);
    let mut patch = String::with_capacity(point.indent.len() + entry.len() + 4);
    if point.offset == text.len() && !text.is_empty() && !text.ends_with('\n') {
        patch.push_str(eol);
    }
    patch.push_str(&point.indent);
    patch.push_str(entry);
    patch.push_str(eol);

    let mut new_text = String::with_capacity(text.len() + patch.len());
    new_text.push_str(&text[..point.offset]);
    new_text.push_str(&patch);
    new_text.push_str(&text[point.offset..]);
    new_text
}
