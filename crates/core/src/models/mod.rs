pub mod chart;
pub mod filter;
pub mod series;
pub mod settings;
pub mod transaction;

/// Lowercase a user-facing label and fold the Spanish accented vowels,
/// so "Dólar", "dolar" and "DOLAR" compare equal.
pub(crate) fn fold_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}
