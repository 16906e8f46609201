//! Offline backend used when no AI credentials are configured.
//!
//! Output depends only on the request, never on time or randomness.

use style_preview_core::GenerationKind;

use super::svg::{escape_xml, to_data_url, truncate};

const PROMPT_PREVIEW_CHARS: usize = 40;

/// Render the placeholder for a request.
#[must_use]
pub fn render(kind: GenerationKind, prompt: Option<&str>) -> String {
    match kind {
        GenerationKind::Prompt => prompt_placeholder(prompt.unwrap_or("No prompt provided")),
        GenerationKind::StyleReference => style_placeholder(),
    }
}

fn prompt_placeholder(prompt: &str) -> String {
    let preview = escape_xml(&truncate(prompt, PROMPT_PREVIEW_CHARS));
    to_data_url(&format!(
        r##"<svg width="512" height="512" xmlns="http://www.w3.org/2000/svg">
<rect width="512" height="512" fill="#f3f4f6"/>
<text x="256" y="200" font-family="Arial" font-size="24" fill="#6b7280" text-anchor="middle">AI Generated Result</text>
<text x="256" y="250" font-family="Arial" font-size="16" fill="#9ca3af" text-anchor="middle">Prompt: {preview}</text>
<text x="256" y="300" font-family="Arial" font-size="14" fill="#d1d5db" text-anchor="middle">[Placeholder - Real AI Not Integrated]</text>
</svg>"##
    ))
}

fn style_placeholder() -> String {
    to_data_url(
        r##"<svg width="512" height="512" xmlns="http://www.w3.org/2000/svg">
<rect width="512" height="512" fill="#fef3c7"/>
<text x="256" y="180" font-family="Arial" font-size="24" fill="#92400e" text-anchor="middle">Style Transfer Result</text>
<text x="256" y="230" font-family="Arial" font-size="16" fill="#b45309" text-anchor="middle">Hair Style Reference Applied</text>
<rect x="206" y="250" width="100" height="100" fill="#fbbf24" stroke="#d97706" stroke-width="2" rx="8"/>
<text x="256" y="305" font-family="Arial" font-size="12" fill="#78350f" text-anchor="middle">Style Sample</text>
<text x="256" y="380" font-family="Arial" font-size="14" fill="#d97706" text-anchor="middle">[Placeholder - Real AI Not Integrated]</text>
</svg>"##,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    use super::*;

    fn decode(data_url: &str) -> String {
        let encoded = data_url
            .strip_prefix("data:image/svg+xml;base64,")
            .unwrap();
        String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_deterministic() {
        let a = render(GenerationKind::Prompt, Some("bob cut"));
        let b = render(GenerationKind::Prompt, Some("bob cut"));
        assert_eq!(a, b);
        assert_ne!(a, render(GenerationKind::Prompt, Some("buzz cut")));
    }

    #[test]
    fn test_prompt_is_truncated_and_escaped() {
        let prompt = format!("<{}>", "x".repeat(60));
        let svg = decode(&render(GenerationKind::Prompt, Some(&prompt)));

        let expected = format!("Prompt: &lt;{}...", "x".repeat(39));
        assert!(svg.contains(&expected));
        assert!(svg.contains("AI Generated Result"));
    }

    #[test]
    fn test_style_reference_card() {
        let svg = decode(&render(GenerationKind::StyleReference, None));
        assert!(svg.contains("Style Transfer Result"));
        assert!(svg.contains("Hair Style Reference Applied"));
    }
}
