/// 按字符数截断，保证不会切断多字节字符
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 用于日志的单行预览
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = truncate_chars(&flat, max_chars);
    if cut.len() < flat.len() {
        format!("{}...", cut)
    } else {
        flat
    }
}
