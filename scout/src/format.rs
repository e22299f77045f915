use crate::Product;

pub const NO_RESULTS: &str = "No results found.";

/// Renders search hits as plain text blocks, keeping the backend's ranking.
#[must_use]
pub fn format_results(products: &[Product]) -> String {
    if products.is_empty() {
        return NO_RESULTS.to_string();
    }

    products
        .iter()
        .map(|product| {
            format!(
                "Title: {}\nDate: {}\nDescription: {}",
                product.title, product.date, product.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
