use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A prospective dance partner as delivered by the user directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    /// Raw style values; any mix of short ids, machine values and labels
    #[serde(rename = "danceStyles", default)]
    pub dance_styles: Vec<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(rename = "photoUrl", default)]
    pub photo_url: Option<String>,
    #[serde(rename = "heightCm", default)]
    pub height_cm: Option<u16>,
    #[serde(rename = "weightKg", default)]
    pub weight_kg: Option<u16>,
    #[serde(default)]
    pub rating: f64,
}

/// The acting user's filter/profile snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeekerPreference {
    #[serde(rename = "danceStyles", default)]
    pub dance_styles: Vec<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(rename = "heightCm", default)]
    pub height_cm: Option<u16>,
    #[serde(rename = "weightKg", default)]
    pub weight_kg: Option<u16>,
}

/// One record of the dance-style taxonomy collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub id: String,
    pub label: String,
    pub value: String,
}

impl TaxonomyEntry {
    pub fn new(id: &str, label: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Ordered skill scale used for level adjacency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

impl SkillLevel {
    fn rank(self) -> u8 {
        match self {
            SkillLevel::Beginner => 0,
            SkillLevel::Intermediate => 1,
            SkillLevel::Advanced => 2,
            SkillLevel::Professional => 3,
        }
    }

    /// True when the two levels are neighbours on the scale
    pub fn is_adjacent(self, other: SkillLevel) -> bool {
        self.rank().abs_diff(other.rank()) == 1
    }
}

impl FromStr for SkillLevel {
    type Err = String;

    /// Accepts the English scale and the Turkish labels used in profile forms
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::core::normalize::normalize(s).as_str() {
            "beginner" | "baslangic" => Ok(SkillLevel::Beginner),
            "intermediate" | "orta" => Ok(SkillLevel::Intermediate),
            "advanced" | "ileri" => Ok(SkillLevel::Advanced),
            "professional" | "pro" | "profesyonel" => Ok(SkillLevel::Professional),
            other => Err(format!("unknown skill level: {}", other)),
        }
    }
}

/// Lifecycle status of a contact request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "contact_status", rename_all = "lowercase")]
pub enum ContactStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Accepted => "accepted",
            ContactStatus::Rejected => "rejected",
            ContactStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Display data for one side of a contact request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactParty {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(rename = "photoUrl", default)]
    pub photo_url: Option<String>,
}

impl ContactParty {
    pub fn new(user_id: &str, display_name: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            photo_url: None,
        }
    }
}

/// An attempt by one user to initiate contact with another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub id: Uuid,
    pub sender: ContactParty,
    pub receiver: ContactParty,
    pub status: ContactStatus,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ContactRequest {
    /// Build a fresh pending request stamped with the current time
    pub fn pending(sender: ContactParty, receiver: ContactParty) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Uuid::new_v4(),
            sender,
            receiver,
            status: ContactStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sender_id(&self) -> &str {
        &self.sender.user_id
    }

    pub fn is_pending(&self) -> bool {
        self.status == ContactStatus::Pending
    }
}

/// Ranked candidate with its derived relevance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(rename = "relevanceScore")]
    pub relevance_score: u32,
    #[serde(rename = "sharedStyles")]
    pub shared_styles: Vec<String>,
}

/// Additive relevance weights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub style: u32,
    pub level_exact: u32,
    pub level_adjacent: u32,
    pub location: u32,
    pub availability: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            style: 20,
            level_exact: 15,
            level_adjacent: 10,
            location: 15,
            availability: 5,
        }
    }
}
