use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::core::filters::RankFilters;
use crate::models::domain::{ContactParty, SeekerPreference};

/// Request to search for dance partners
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchPartnersRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "seeker_id", rename = "seekerId")]
    pub seeker_id: String,
    #[serde(default)]
    pub filters: RankFilters,
    /// Absent for anonymous browsing
    #[serde(default)]
    pub preference: Option<SeekerPreference>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to open a contact request between two users
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendContactRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "sender_id", rename = "senderId")]
    pub sender_id: String,
    #[serde(rename = "senderName", default)]
    pub sender_name: String,
    #[serde(rename = "senderPhotoUrl", default)]
    pub sender_photo_url: Option<String>,
    #[validate(length(min = 1))]
    #[serde(alias = "receiver_id", rename = "receiverId")]
    pub receiver_id: String,
    #[serde(rename = "receiverName", default)]
    pub receiver_name: String,
    #[serde(rename = "receiverPhotoUrl", default)]
    pub receiver_photo_url: Option<String>,
}

impl SendContactRequest {
    pub fn sender(&self) -> ContactParty {
        ContactParty {
            user_id: self.sender_id.clone(),
            display_name: self.sender_name.clone(),
            photo_url: self.sender_photo_url.clone(),
        }
    }

    pub fn receiver(&self) -> ContactParty {
        ContactParty {
            user_id: self.receiver_id.clone(),
            display_name: self.receiver_name.clone(),
            photo_url: self.receiver_photo_url.clone(),
        }
    }
}
