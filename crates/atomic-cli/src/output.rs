//! Formatted output helpers for CLI commands.

/// Column width label values are wrapped at.
pub const VALUE_WIDTH: usize = 60;

/// Word-wraps `text` into lines of at most `width` characters.
///
/// Words longer than `width` are kept whole on their own line.
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Renders label pairs as a NAME/VALUE table, continuation lines of
/// wrapped values indented under the value column.
#[must_use]
pub fn label_table(rows: &[(String, String)]) -> String {
    let name_width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain(std::iter::once("NAME".len()))
        .max()
        .unwrap_or_default();

    let mut out = format!("{:<name_width$}  VALUE\n", "NAME");
    for (name, value) in rows {
        for (i, line) in wrap(value, VALUE_WIDTH).iter().enumerate() {
            let label = if i == 0 { name.as_str() } else { "" };
            out.push_str(format!("{label:<name_width$}  {line}").trim_end());
            out.push('\n');
        }
    }
    out
}

/// "yes" or "no".
#[must_use]
pub const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Displays an optional value, or "-" when absent.
#[must_use]
pub fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
