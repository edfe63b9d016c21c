//! Cleanup of structured model output before parsing.

/// Remove a Markdown code fence wrapped around generated markup.
///
/// Models often answer "only JSON" with ```` ```json ... ``` ````. The info
/// string on the opening fence is dropped with it. Text without a fence is
/// returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
