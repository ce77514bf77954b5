use crate::core::normalize::normalize;

/// A major city with the query spellings that select it
#[derive(Debug, Clone, Copy)]
pub struct CityAlias {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

/// Cities searched often enough to deserve abbreviation handling.
/// All strings are already normalized.
pub const MAJOR_CITIES: &[CityAlias] = &[
    CityAlias {
        canonical: "istanbul",
        aliases: &["ist", "istanbul", "stanbul", "stambul"],
    },
    CityAlias {
        canonical: "ankara",
        aliases: &["ank", "ankara"],
    },
    CityAlias {
        canonical: "izmir",
        aliases: &["izm", "izmir", "smyrna"],
    },
    CityAlias {
        canonical: "antalya",
        aliases: &["ayt", "antalya"],
    },
    CityAlias {
        canonical: "bursa",
        aliases: &["brs", "bursa"],
    },
];

/// Free-text location matcher
#[derive(Debug, Clone, Copy)]
pub struct LocationMatcher {
    cities: &'static [CityAlias],
}

impl LocationMatcher {
    pub fn new() -> Self {
        Self {
            cities: MAJOR_CITIES,
        }
    }

    pub fn with_cities(cities: &'static [CityAlias]) -> Self {
        Self { cities }
    }

    /// Decide whether a candidate's location satisfies the query
    ///
    /// Anchored matches (city aliases, word prefixes) are tried before the loose
    /// substring fallback. A query that is a known city alias never falls back
    /// to substring matching: an abbreviation like `"ist"` must not match a
    /// location such as `"Ürgüp Pistachio"` just because the letters occur
    /// mid-word.
    /// Reflexive, since an identical location always passes the word check.
    /// Not transitive.
    pub fn matches(&self, location: &str, query: &str) -> bool {
        let location = normalize(location);
        let query = normalize(query);

        if location.is_empty() || query.is_empty() {
            return false;
        }

        let city = self.city_for_alias(&query);
        if let Some(city) = city {
            if location.contains(city.canonical) {
                return true;
            }
        }

        if location
            .split_whitespace()
            .any(|word| word == query || word.starts_with(query.as_str()))
        {
            return true;
        }

        city.is_none() && location.contains(query.as_str())
    }

    fn city_for_alias(&self, query: &str) -> Option<&'static CityAlias> {
        self.cities
            .iter()
            .find(|city| city.aliases.contains(&query))
    }
}

impl Default for LocationMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper over the default matcher
pub fn location_matches(location: &str, query: &str) -> bool {
    LocationMatcher::new().matches(location, query)
}
