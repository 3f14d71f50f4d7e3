//! Example prompts offered above the input box.

/// Number of rows the suggestions are laid out in
pub const SUGGESTION_ROWS: usize = 3;

/// Built-in example prompts
pub const DEFAULT_SUGGESTIONS: &[&str] = &[
    "I want to buy a gaming laptop under ₹80,000",
    "I want to sell my old bike",
    "Looking for a 55 inch smart TV",
    "Need a washing machine for a family of four",
    "I want to sell handmade candles",
    "Suggest a phone with a great camera",
    "I need a sofa set with home delivery",
    "I want to sell my used textbooks",
    "Looking for running shoes for daily jogging",
];

/// Deal `items` into `rows` rows round-robin: element `i` lands in row `i % rows`.
///
/// Order within each row follows the original order. Zero rows yields no rows.
pub fn partition_rows<T>(items: &[T], rows: usize) -> Vec<Vec<&T>> {
    let mut out: Vec<Vec<&T>> = (0..rows).map(|_| Vec::new()).collect();
    if rows == 0 {
        return out;
    }

    for (i, item) in items.iter().enumerate() {
        out[i % rows].push(item);
    }
    out
}

/// The built-in suggestions laid out in [`SUGGESTION_ROWS`] rows
pub fn suggestion_rows() -> Vec<Vec<&'static str>> {
    partition_rows(DEFAULT_SUGGESTIONS, SUGGESTION_ROWS)
        .into_iter()
        .map(|row| row.into_iter().copied().collect())
        .collect()
}
