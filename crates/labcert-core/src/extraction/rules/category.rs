//! Laboratory category inference.

use crate::models::certificate::Category;

use super::{ExtractionMatch, FieldExtractor};

/// Keyword cascade over [`Category::KEYWORDS`].
///
/// The earliest-listed keyword present wins regardless of where it appears.
pub struct CategoryExtractor;

impl CategoryExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CategoryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CategoryExtractor {
    type Output = ExtractionMatch<Category>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for (keyword, category) in Category::KEYWORDS {
            let Some(start) = text.find(*keyword) else {
                continue;
            };
            if results.iter().any(|r| &r.value == category) {
                continue;
            }
            results.push(
                ExtractionMatch::new(category.clone(), 1.0, *keyword)
                    .with_position(start, start + keyword.len()),
            );
        }

        results
    }
}

/// Infer the category from normalized text.
pub fn extract_category(text: &str) -> Option<Category> {
    CategoryExtractor::new().extract(text).map(|m| m.value)
}
