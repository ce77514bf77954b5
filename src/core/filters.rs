use crate::core::location::LocationMatcher;
use crate::core::normalize::normalize;
use crate::core::scoring::{levels_equal, ResolvedCandidate};
use crate::core::taxonomy::{StyleLabel, StyleTaxonomy};
use serde::{Deserialize, Serialize};

/// Filter values chosen by the seeker; empty values are not applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankFilters {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub availability: Vec<String>,
}

/// Which filter a selection targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Style,
    Gender,
    Level,
    Location,
    Availability,
}

/// What selecting the currently active value does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reselect {
    /// Selecting the active value again removes the constraint
    #[default]
    ClearOnRepeat,
    /// Selecting always sets the value
    Replace,
}

impl RankFilters {
    pub fn is_empty(&self) -> bool {
        is_blank(&self.style)
            && is_blank(&self.gender)
            && is_blank(&self.level)
            && is_blank(&self.location)
            && self.availability.iter().all(|slot| normalize(slot).is_empty())
    }

    /// Apply one selection to the filter set
    ///
    /// For single-valued fields a repeated value clears the field under
    /// `Reselect::ClearOnRepeat`. Availability is a set: a repeated slot is
    /// removed, a new one is added. An empty value clears the field.
    pub fn select(&mut self, field: FilterField, value: &str, reselect: Reselect) {
        let key = normalize(value);

        let slot = match field {
            FilterField::Style => &mut self.style,
            FilterField::Gender => &mut self.gender,
            FilterField::Level => &mut self.level,
            FilterField::Location => &mut self.location,
            FilterField::Availability => {
                if key.is_empty() {
                    self.availability.clear();
                    return;
                }
                let position = self.availability.iter().position(|s| normalize(s) == key);
                match (position, reselect) {
                    (Some(index), Reselect::ClearOnRepeat) => {
                        self.availability.remove(index);
                    }
                    (Some(_), Reselect::Replace) => {}
                    (None, _) => self.availability.push(value.trim().to_string()),
                }
                return;
            }
        };

        let repeated = slot.as_deref().map(normalize).is_some_and(|current| current == key);
        *slot = if key.is_empty() || (repeated && reselect == Reselect::ClearOnRepeat) {
            None
        } else {
            Some(value.trim().to_string())
        };
    }

    /// Builder form of [`RankFilters::select`]
    pub fn with(mut self, field: FilterField, value: &str, reselect: Reselect) -> Self {
        self.select(field, value, reselect);
        self
    }

    /// Compile the filters into predicates against one taxonomy
    pub fn compile(&self, taxonomy: &StyleTaxonomy, matcher: LocationMatcher) -> CompiledFilters {
        let slots: Vec<String> = self
            .availability
            .iter()
            .map(|slot| normalize(slot))
            .filter(|slot| !slot.is_empty())
            .collect();

        CompiledFilters {
            style: non_blank(&self.style).map(|s| taxonomy.resolve(s)),
            gender: non_blank(&self.gender).map(normalize),
            level: non_blank(&self.level).map(normalize),
            location: non_blank(&self.location).map(str::to_string),
            slots,
            matcher,
        }
    }
}

/// Conjunctive predicate set over resolved candidates
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    style: Option<StyleLabel>,
    gender: Option<String>,
    level: Option<String>,
    location: Option<String>,
    slots: Vec<String>,
    matcher: LocationMatcher,
}

impl CompiledFilters {
    /// True when the candidate passes every supplied filter
    #[inline]
    pub fn matches(&self, candidate: &ResolvedCandidate) -> bool {
        if let Some(style) = &self.style {
            if !candidate.has_style(style) {
                return false;
            }
        }

        if let Some(gender) = &self.gender {
            let candidate_gender = candidate.candidate.gender.as_deref().map(normalize);
            if candidate_gender.as_ref() != Some(gender) {
                return false;
            }
        }

        if let Some(level) = &self.level {
            if !levels_equal(&candidate.level, level) {
                return false;
            }
        }

        if let Some(query) = &self.location {
            if !self.matcher.matches(&candidate.location, query) {
                return false;
            }
        }

        if !self.slots.is_empty() && !self.slots.iter().any(|slot| candidate.slots.contains(slot)) {
            return false;
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !normalize(v).is_empty())
}

fn is_blank(value: &Option<String>) -> bool {
    non_blank(value).is_none()
}
