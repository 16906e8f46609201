//! SVG placeholders and result cards, returned as `data:` URLs.
//!
//! Text backends answer with a description instead of pixels; those answers
//! are laid out on a fixed 800x1000 card so every generation still yields an
//! image reference.

use std::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

const CARD_TEXT_X: u32 = 80;
const CARD_TEXT_Y: u32 = 320;
const CARD_TEXT_WIDTH: u32 = 640;
const CARD_FONT_SIZE: u32 = 14;
const CARD_MAX_LINES: usize = 30;

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap an SVG document in a base64 `data:` URL.
#[must_use]
pub fn to_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

/// First `max` characters of `text`, with `...` appended if anything was cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().count() > max {
        out.push_str("...");
    }
    out
}

/// Greedy word wrap into lines of at most `max_chars` characters.
///
/// A single word longer than `max_chars` gets a line of its own.
#[must_use]
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Render a text answer as a result card.
///
/// `label` is shown under "Requested Style:", `powered_by` names the backend.
#[must_use]
pub fn result_card(description: &str, label: &str, powered_by: &str) -> String {
    // average glyph width is ~0.6em
    let max_chars = (CARD_TEXT_WIDTH * 10 / (CARD_FONT_SIZE * 6)) as usize;
    let mut body = String::new();
    for (i, line) in wrap_words(description, max_chars)
        .iter()
        .take(CARD_MAX_LINES)
        .enumerate()
    {
        let y = CARD_TEXT_Y as usize + i * (CARD_FONT_SIZE as usize + 8);
        let _ = write!(
            body,
            r##"<text x="{CARD_TEXT_X}" y="{y}" font-family="Arial, sans-serif" font-size="{CARD_FONT_SIZE}" fill="#444">{}</text>"##,
            escape_xml(line)
        );
    }

    let svg = format!(
        r##"<svg width="800" height="1000" xmlns="http://www.w3.org/2000/svg">
<defs><linearGradient id="grad1" x1="0%" y1="0%" x2="0%" y2="100%"><stop offset="0%" style="stop-color:#667eea;stop-opacity:1"/><stop offset="100%" style="stop-color:#764ba2;stop-opacity:1"/></linearGradient></defs>
<rect width="800" height="1000" fill="url(#grad1)"/>
<rect x="40" y="40" width="720" height="920" fill="white" rx="20"/>
<text x="400" y="100" font-family="Arial, sans-serif" font-size="32" font-weight="bold" fill="#667eea" text-anchor="middle">AI Hairstyle Preview</text>
<text x="400" y="140" font-family="Arial, sans-serif" font-size="16" fill="#764ba2" text-anchor="middle">Powered by {powered_by}</text>
<line x1="100" y1="160" x2="700" y2="160" stroke="#e0e0e0" stroke-width="2"/>
<text x="80" y="200" font-family="Arial, sans-serif" font-size="18" font-weight="bold" fill="#333">Requested Style:</text>
<text x="80" y="230" font-family="Arial, sans-serif" font-size="14" fill="#666" font-style="italic">{label}</text>
<text x="80" y="280" font-family="Arial, sans-serif" font-size="18" font-weight="bold" fill="#333">AI Analysis &amp; Visualization:</text>
{body}
<rect x="60" y="880" width="680" height="60" fill="#f0f0f0" rx="10"/>
<text x="400" y="915" font-family="Arial, sans-serif" font-size="12" fill="#666" text-anchor="middle">This is an AI-generated description. For actual visual results, integrate with image generation models.</text>
</svg>"##,
        powered_by = escape_xml(powered_by),
        label = escape_xml(&truncate(label, 80)),
    );

    to_data_url(&svg)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decode(data_url: &str) -> String {
        let encoded = data_url
            .strip_prefix("data:image/svg+xml;base64,")
            .unwrap();
        String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &apos;Jerry&apos;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("bob cut", 40), "bob cut");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap_words("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);

        let lines = wrap_words("supercalifragilistic ok", 5);
        assert_eq!(lines, vec!["supercalifragilistic", "ok"]);
    }

    #[test]
    fn test_result_card_caps_lines() {
        let description = "word ".repeat(2000);
        let svg = decode(&result_card(&description, "Fade", "OpenAI GPT-4 Vision"));

        assert_eq!(svg.matches(r##"fill="#444""##).count(), CARD_MAX_LINES);
        assert!(svg.contains("Powered by OpenAI GPT-4 Vision"));
        assert!(svg.contains(">Fade<"));
    }
}
