use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::debug;

use super::{ParseError, ParsedMessage};

const MAGNET_TOKEN: &str = "magnet:";

/// Separator between the post heading and the release line.
const HEADER_DELIMITER: &str = ":\n";

/// `Title / Alternative Title (aside) [2010, ...`
static RELEASE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s/\s(.*?)(?:\s\(.*?\))?\s\[(\d{4}),").unwrap()
});

/// Parse an inbound chat message.
///
/// The magnet link is the text from the first `magnet:` token up to the next
/// line break, trimmed. A magnet on the last line without a trailing line
/// break is not accepted.
///
/// Release hints are read from the line right after the first `":\n"`
/// delimiter when that line ends before the magnet. Missing or unmatched hints
/// are not an error; the corresponding fields stay `None`.
pub fn parse_message(text: &str) -> Result<ParsedMessage, ParseError> {
    let magnet_start = text.find(MAGNET_TOKEN).ok_or(ParseError::NoMagnetFound)?;
    let line_len = text[magnet_start..]
        .find('\n')
        .ok_or(ParseError::NoMagnetFound)?;
    let magnet = text[magnet_start..magnet_start + line_len].trim();

    let mut parsed = ParsedMessage::magnet_only(magnet);

    if let Some(line) = release_line(text, magnet_start) {
        if let Some(caps) = RELEASE_LINE.captures(line) {
            parsed.title = non_empty(caps.get(1).map(|m| m.as_str()));
            parsed.alternative_title = non_empty(caps.get(2).map(|m| m.as_str()));
            parsed.year = caps.get(3).map(|m| m.as_str().to_string());
        } else {
            debug!("Release line did not match title pattern: {:?}", line);
        }
    }

    Ok(parsed)
}

/// The line following the header delimiter, if it ends before the magnet.
fn release_line(text: &str, magnet_start: usize) -> Option<&str> {
    let start = text.find(HEADER_DELIMITER)? + HEADER_DELIMITER.len();
    if start > magnet_start {
        return None;
    }
    let span = &text[start..magnet_start];
    let end = span.find('\n')?;
    Some(&span[..end])
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
