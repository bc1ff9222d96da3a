//! Translation providers.
//!
//! A provider turns one [`TranslationRequest`](crate::types::requests::TranslationRequest)
//! into a translation. The default [`BrowserProvider`] renders the translator
//! page in a headless browser; [`MockProvider`] is a scripted stand-in for
//! tests.

mod base;
mod browser;
mod extract;
mod mock;
mod serialized;

pub use crate::types::errors::ProviderError;
pub use base::TranslationProvider;
pub use browser::BrowserProvider;
pub use extract::{extract_translation, validate_selector};
pub use mock::{MockMode, MockProvider};
pub use serialized::SerializedProvider;
