//! Text assembly shared by both generators.

/// Replace every maximal run of characters outside `[A-Za-z0-9_]` with a single `_`.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Prefix every line of `text`. A trailing newline does not start a new line.
pub fn prefix_lines(text: &str, prefix: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(text.len() + prefix.len());
    let body = text.strip_suffix('\n');
    for (i, line) in body.unwrap_or(text).split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(prefix);
        out.push_str(line);
    }
    if body.is_some() {
        out.push('\n');
    }
    out
}

/// `%1 %2 ... %count`.
pub fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("%{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A JSON string literal.
pub fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// A JSON number. Integral values print without a fraction.
pub fn number(n: f64) -> String {
    if n.is_finite() && n == n.floor() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.is_finite() {
        format!("{}", n)
    } else {
        // JSON has no infinities; callers filter these out before rendering.
        "null".to_string()
    }
}

/// A JSON object, one entry per line, two-space indented.
/// Values are pre-rendered and may span several lines.
pub fn object(entries: &[(&str, String)]) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }
    let body = entries
        .iter()
        .map(|(key, value)| format!("{}: {}", quote(key), value))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{}\n}}", prefix_lines(&body, "  "))
}

/// A JSON array, one item per line. An item may already hold several
/// comma-joined elements.
pub fn array(items: &[String]) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    format!("[\n{}\n]", prefix_lines(&items.join(",\n"), "  "))
}
