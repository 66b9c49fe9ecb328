use std::sync::LazyLock;

use note_mirror::{Listing, ListingError, RemoteEntry};
use regex::Regex;

/// Text that identifies the script block carrying the listing payload.
pub const PAYLOAD_MARKER: &str = "const json";

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("script block pattern is valid")
});

/// Extract the directory entries embedded in a listing page.
///
/// The device serves an HTML page whose script sets
/// `const json = '{"fileList": [...]}'`. The first quoted literal after
/// the marker is parsed as the payload.
pub fn parse_listing(html: &str) -> Result<Vec<RemoteEntry>, ListingError> {
    let script = SCRIPT_BLOCK
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|body| body.contains(PAYLOAD_MARKER))
        .ok_or(ListingError::MissingPayload)?;

    let after_marker = script
        .split_once(PAYLOAD_MARKER)
        .map(|(_, rest)| rest)
        .ok_or(ListingError::MissingPayload)?;

    let payload = first_quoted_literal(after_marker)?;

    let listing = Listing::from_json(&payload)
        .map_err(|e| ListingError::Malformed(e.to_string()))?;

    Ok(listing.file_list)
}

fn first_quoted_literal(text: &str) -> Result<String, ListingError> {
    let (start, quote) = text
        .char_indices()
        .find(|(_, c)| *c == '\'' || *c == '"')
        .ok_or(ListingError::MissingPayload)?;

    let body = &text[start + 1..];
    let mut escaped = false;
    let end = body
        .char_indices()
        .find(|(_, c)| {
            let closes = *c == quote && !escaped;
            escaped = *c == '\\' && !escaped;
            closes
        })
        .map(|(idx, _)| idx)
        .ok_or_else(|| ListingError::Malformed("unterminated payload literal".into()))?;

    let literal = &body[..end];

    if quote == '"' {
        // A double-quoted literal carries an escaped JSON document.
        serde_json::from_str::<String>(&format!("\"{literal}\""))
            .map_err(|e| ListingError::Malformed(e.to_string()))
    } else {
        Ok(literal.to_owned())
    }
}
