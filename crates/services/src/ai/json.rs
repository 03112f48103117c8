/// Find the first balanced JSON object or array embedded in `text`.
///
/// Brackets inside JSON strings (including escaped quotes) do not count toward
/// the balance. Returns `None` when no opening bracket is ever closed.
#[must_use]
pub fn extract_json(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find(['{', '[']) {
        let start = search_from + offset;
        if let Some(end) = balanced_end(bytes, start) {
            return Some(&text[start..=end]);
        }
        search_from = start + 1;
    }
    None
}

fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_object_inside_prose() {
        let text = "Sure! Here you go:\n{\"score\": 85, \"feedback\": \"ok\"}\nAnything else?";
        assert_eq!(extract_json(text), Some("{\"score\": 85, \"feedback\": \"ok\"}"));
    }

    #[test]
    fn finds_array_in_code_fence() {
        let text = "```json\n[{\"question\": \"a\"}]\n```";
        assert_eq!(extract_json(text), Some("[{\"question\": \"a\"}]"));
    }

    #[test]
    fn brackets_inside_strings_are_ignored() {
        let text = r#"{"feedback": "use } and ] carefully \" {", "score": 70} trailing }"#;
        assert_eq!(
            extract_json(text),
            Some(r#"{"feedback": "use } and ] carefully \" {", "score": 70}"#)
        );
    }

    #[test]
    fn stops_at_first_balanced_value() {
        let text = r#"{"a": 1} and {"b": 2}"#;
        assert_eq!(extract_json(text), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn skips_unbalanced_prefix() {
        let text = r#"oops { not closed ["ok"]"#;
        assert_eq!(extract_json(text), Some(r#"["ok"]"#));
        let text = r#"stray ] then {"ok": true}"#;
        assert_eq!(extract_json(text), Some(r#"{"ok": true}"#));
    }

    #[test]
    fn plain_text_has_no_json() {
        assert_eq!(extract_json("I cannot help with that."), None);
        assert_eq!(extract_json(""), None);
    }
}
