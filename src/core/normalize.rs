/// Fold a single Turkish-alphabet letter to its unaccented Latin form.
///
/// Only the letters of the supported locale are mapped; everything else is
/// left for regular lower-casing.
#[inline]
fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'ç' | 'Ç' => 'c',
        'ğ' | 'Ğ' => 'g',
        'ı' | 'İ' | 'I' => 'i',
        'ö' | 'Ö' => 'o',
        'ş' | 'Ş' => 's',
        'ü' | 'Ü' => 'u',
        'â' | 'Â' => 'a',
        'î' | 'Î' => 'i',
        'û' | 'Û' => 'u',
        _ => return None,
    };
    Some(folded)
}

/// Canonicalize free text for comparison
///
/// Lower-cases, folds Turkish letters, turns commas into spaces and collapses
/// whitespace runs. Empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            // Left behind when `İ` was lower-cased outside the locale
            '\u{0307}' => {}
            ',' => folded.push(' '),
            c => match fold_char(c) {
                Some(f) => folded.push(f),
                None => folded.extend(c.to_lowercase()),
            },
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an optional value, treating `None` as empty
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}
