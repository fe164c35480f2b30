/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Find the first balanced `{...}` substring in free-form model output.
///
/// Models wrap JSON in prose or code fences despite strict-JSON
/// instructions; this recovers the object without a full JSON parse. Brace
/// characters inside string literals are not special-cased, which is good
/// enough for the flat verdict objects we ask for.
pub fn first_json_object(text: &str) -> Option<&str> {
    let text = strip_code_blocks(text);
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (i, c) in text[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
