/// Escapes characters that are significant in Markdown.
///
/// Backslashes are escaped along with everything else in one pass, so the
/// inserted escapes are never escaped again.
pub(crate) fn escape_markdown_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '(' | ')' | '#' | '+' | '-' | '.' | '!'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
