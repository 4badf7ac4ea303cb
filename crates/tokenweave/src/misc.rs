use alloc::string::String;

/// Replaces tab, newline and carriage return with their backslash escapes,
/// and spaces with `·` when `escape_spaces` is set.
#[must_use]
pub fn escape_whitespace(s: &str, escape_spaces: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            ' ' if escape_spaces => out.push('\u{00B7}'),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_whitespace() {
        assert_eq!(escape_whitespace("a\tb\r\nc d", false), "a\\tb\\r\\nc d");
        assert_eq!(escape_whitespace("c d", true), "c\u{00B7}d");
    }
}
