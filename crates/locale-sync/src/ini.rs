//! Helpers for the `key=value` locale file format.
//!
//! ```ini
//! [section]
//! key1=value1
//! key2=value2
//! ```

/// Placeholder uploaded in place of an empty file; the backend rejects
/// empty uploads.
pub const EMPTY_FILE_PLACEHOLDER: &str = "; empty";

/// True if the content holds no translated strings: every line is blank,
/// a section header or a comment. A leading byte order mark is ignored.
pub fn is_empty_translation(content: &str) -> bool {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('[') || line.starts_with(';') || line.starts_with('#')
    })
}

/// Wrap values containing `"` or `;` in quotes.
///
/// A semicolon starts a comment and a bare quote is parsed as an escape by
/// the backend, so such values are otherwise truncated on import. Values that
/// are already quoted are left alone.
pub fn escape_values(content: &str) -> String {
    let mut result = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        match body.split_once('=') {
            Some((key, value)) if is_key(key) && needs_quotes(value) => {
                result.push_str(key);
                result.push_str("=\"");
                result.push_str(value);
                result.push('"');
                result.push_str(ending);
            }
            _ => result.push_str(line),
        }
    }

    result
}

/// Content to send for a locale file: escaped, with empty files replaced
/// by [`EMPTY_FILE_PLACEHOLDER`].
pub fn prepare_upload(content: &str) -> String {
    let escaped = escape_values(content);
    if escaped.is_empty() {
        EMPTY_FILE_PLACEHOLDER.to_owned()
    } else {
        escaped
    }
}

fn is_key(key: &str) -> bool {
    let key = key.trim_start();
    !key.contains('[') && !key.starts_with(';') && !key.starts_with('#')
}

fn needs_quotes(value: &str) -> bool {
    let already_quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    (value.contains('"') || value.contains(';')) && !already_quoted
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}
