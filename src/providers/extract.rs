//! Extraction of the translation from a rendered page.

use scraper::{Html, Selector};

use crate::types::errors::ProviderError;
use crate::{TranslatorError, TranslatorResult};

/// Checks that `selector` is a valid CSS selector.
pub fn validate_selector(selector: &str) -> TranslatorResult<()> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| TranslatorError::config(format!("invalid selector '{}': {:?}", selector, e)))
}

/// Returns the trimmed text of the first element matching `selector`.
///
/// When nothing matches, the error message includes the page title so that
/// throttling pages ("Too many requests") can still be classified.
pub fn extract_translation(html: &str, selector: &str) -> Result<String, ProviderError> {
    let selector = Selector::parse(selector)
        .map_err(|e| ProviderError::new(format!("invalid selector '{}': {:?}", selector, e)))?;
    let document = Html::parse_document(html);

    let found = document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty());

    match found {
        Some(text) => Ok(text),
        None => {
            let title = page_title(&document);
            Err(match title {
                Some(title) => ProviderError::new(format!(
                    "Translation not found on the page (title: {})",
                    title
                )),
                None => ProviderError::new("Translation not found on the page"),
            })
        }
    }
}

fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECTOR: &str = "span.sentence_highlight";

    #[test]
    fn test_extracts_trimmed_text() {
        let html = r#"
            <html><body>
              <div class="target">
                <span class="sentence_highlight">
                   Hallo Welt
                </span>
              </div>
            </body></html>
        "#;

        assert_eq!(extract_translation(html, SELECTOR).unwrap(), "Hallo Welt");
    }

    #[test]
    fn test_joins_nested_text() {
        let html = r#"<span class="sentence_highlight">Guten <b>Morgen</b></span>"#;
        assert_eq!(extract_translation(html, SELECTOR).unwrap(), "Guten Morgen");
    }

    #[test]
    fn test_missing_element_reports_title() {
        let html = "<html><head><title>Too many requests</title></head><body></body></html>";

        let err = extract_translation(html, SELECTOR).unwrap_err();
        assert!(err.message.contains("not found"));
        assert!(err.message.contains("Too many requests"));
    }

    #[test]
    fn test_skips_empty_matches() {
        let html = r#"
            <span class="sentence_highlight">  </span>
            <span class="sentence_highlight">Bonjour</span>
        "#;
        assert_eq!(extract_translation(html, SELECTOR).unwrap(), "Bonjour");
    }

    #[test]
    fn test_validate_selector() {
        assert!(validate_selector(SELECTOR).is_ok());
        assert!(validate_selector("span[").is_err());
    }
}
