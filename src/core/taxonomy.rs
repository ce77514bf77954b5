use crate::core::normalize::normalize;
use crate::models::TaxonomyEntry;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// Built-in styles used when the taxonomy collection is empty or unreachable
const BUILTIN_STYLES: &[(&str, &str, &str)] = &[
    ("sal", "Salsa", "salsa"),
    ("bac", "Bachata", "bachata"),
    ("kiz", "Kizomba", "kizomba"),
    ("tng", "Argentine Tango", "argentine_tango"),
    ("zouk", "Zouk", "zouk"),
    ("wcs", "West Coast Swing", "west_coast_swing"),
    ("lindy", "Lindy Hop", "lindy_hop"),
    ("cha", "Cha-Cha", "cha_cha"),
    ("mer", "Merengue", "merengue"),
    ("wal", "Waltz", "waltz"),
    ("hh", "Hip Hop", "hip_hop"),
];

/// A dance style after taxonomy resolution
///
/// Equality and hashing use the normalized form, so `"Salsa"` and `"salsa"`
/// are the same style even when one of them was not found in the taxonomy.
#[derive(Debug, Clone)]
pub struct StyleLabel {
    label: String,
    key: String,
}

impl StyleLabel {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            key: normalize(label),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl PartialEq for StyleLabel {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for StyleLabel {}

impl Hash for StyleLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for StyleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for StyleLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

/// Immutable lookup from any style spelling to its canonical label
#[derive(Debug, Clone, Default)]
pub struct StyleTaxonomy {
    lookup: HashMap<String, usize>,
    labels: Vec<String>,
    fallback: bool,
}

impl StyleTaxonomy {
    /// Build the lookup from taxonomy entries
    ///
    /// Each entry is reachable through its id, machine value and display
    /// label. On a key collision the later entry wins.
    pub fn build(entries: &[TaxonomyEntry]) -> Self {
        let mut lookup = HashMap::with_capacity(entries.len() * 3);
        let mut labels = Vec::with_capacity(entries.len());

        for entry in entries {
            let index = labels.len();
            labels.push(entry.label.clone());

            for key in [&entry.id, &entry.value, &entry.label] {
                let key = normalize(key);
                if key.is_empty() {
                    continue;
                }
                if let Some(previous) = lookup.insert(key.clone(), index) {
                    if previous != index {
                        tracing::warn!(
                            "Taxonomy key '{}' maps to both '{}' and '{}', keeping the latter",
                            key,
                            labels[previous],
                            entry.label
                        );
                    }
                }
            }
        }

        Self {
            lookup,
            labels,
            fallback: false,
        }
    }

    /// The fixed fallback taxonomy
    pub fn builtin() -> Self {
        let mut taxonomy = Self::build(&builtin_entries());
        taxonomy.fallback = true;
        taxonomy
    }

    /// Build from a fetched collection, seeding from the built-in list when empty
    pub fn from_entries_or_builtin(entries: &[TaxonomyEntry]) -> Self {
        if entries.is_empty() {
            tracing::warn!("Style taxonomy is empty, using built-in fallback");
            Self::builtin()
        } else {
            Self::build(entries)
        }
    }

    /// Map a raw style value to its canonical label, or keep it unchanged
    pub fn resolve(&self, raw: &str) -> StyleLabel {
        match self.lookup.get(&normalize(raw)) {
            Some(&index) => StyleLabel::new(&self.labels[index]),
            None => StyleLabel::new(raw),
        }
    }

    /// Resolve a list of raw values, dropping blanks and duplicates
    pub fn resolve_all<S: AsRef<str>>(&self, raw: &[S]) -> Vec<StyleLabel> {
        let mut resolved: Vec<StyleLabel> = Vec::with_capacity(raw.len());
        for value in raw {
            let label = self.resolve(value.as_ref());
            if !label.is_empty() && !resolved.contains(&label) {
                resolved.push(label);
            }
        }
        resolved
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.lookup.contains_key(&normalize(raw))
    }

    /// Number of taxonomy entries
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// True when this table came from the built-in list
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// The built-in taxonomy as entries
pub fn builtin_entries() -> Vec<TaxonomyEntry> {
    BUILTIN_STYLES
        .iter()
        .map(|(id, label, value)| TaxonomyEntry::new(id, label, value))
        .collect()
}

/// Session-wide taxonomy handle
///
/// Readers take an `Arc` snapshot; a refresh builds a complete table and swaps
/// the pointer, so no reader ever sees a partially built table.
#[derive(Debug)]
pub struct SharedTaxonomy {
    current: RwLock<Arc<StyleTaxonomy>>,
}

impl SharedTaxonomy {
    pub fn new(taxonomy: StyleTaxonomy) -> Self {
        Self {
            current: RwLock::new(Arc::new(taxonomy)),
        }
    }

    pub fn snapshot(&self) -> Arc<StyleTaxonomy> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the table, returning the previous one
    pub fn replace(&self, taxonomy: StyleTaxonomy) -> Arc<StyleTaxonomy> {
        let next = Arc::new(taxonomy);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }
}

impl Default for SharedTaxonomy {
    fn default() -> Self {
        Self::new(StyleTaxonomy::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_all_three_spellings() {
        let taxonomy = StyleTaxonomy::builtin();

        assert_eq!(taxonomy.resolve("sal").as_str(), "Salsa");
        assert_eq!(taxonomy.resolve("salsa").as_str(), "Salsa");
        assert_eq!(taxonomy.resolve("SALSA").as_str(), "Salsa");
        assert_eq!(taxonomy.resolve("west_coast_swing").as_str(), "West Coast Swing");
        assert_eq!(taxonomy.resolve("wcs").as_str(), "West Coast Swing");
    }

    #[test]
    fn test_unknown_style_kept_unchanged() {
        let taxonomy = StyleTaxonomy::builtin();
        assert_eq!(taxonomy.resolve("Horon").as_str(), "Horon");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let taxonomy = StyleTaxonomy::builtin();
        for raw in ["tng", "Argentine Tango", "hip_hop", "Horon", ""] {
            let once = taxonomy.resolve(raw);
            let twice = taxonomy.resolve(once.as_str());
            assert_eq!(once.as_str(), twice.as_str());
        }
    }

    #[test]
    fn test_empty_entries_use_builtin() {
        let taxonomy = StyleTaxonomy::from_entries_or_builtin(&[]);
        assert!(taxonomy.is_fallback());
        assert_eq!(taxonomy.len(), 11);
        assert_eq!(taxonomy.resolve("salsa").as_str(), "Salsa");
    }

    #[test]
    fn test_collision_last_write_wins() {
        let taxonomy = StyleTaxonomy::build(&[
            TaxonomyEntry::new("a", "Salsa", "salsa"),
            TaxonomyEntry::new("b", "Salsa On2", "salsa"),
        ]);

        assert_eq!(taxonomy.resolve("salsa").as_str(), "Salsa On2");
        assert_eq!(taxonomy.resolve("a").as_str(), "Salsa");
    }

    #[test]
    fn test_resolve_all_dedupes() {
        let taxonomy = StyleTaxonomy::builtin();
        let resolved = taxonomy.resolve_all(&["sal", "Salsa", "", "bachata"]);
        let labels: Vec<&str> = resolved.iter().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["Salsa", "Bachata"]);
    }

    #[test]
    fn test_shared_taxonomy_swaps() {
        let shared = SharedTaxonomy::default();
        let before = shared.snapshot();

        shared.replace(StyleTaxonomy::build(&[TaxonomyEntry::new("x", "Horon", "horon")]));

        assert_eq!(before.resolve("x").as_str(), "x");
        assert_eq!(shared.snapshot().resolve("x").as_str(), "Horon");
    }
}
