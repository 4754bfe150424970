use serde::{Deserialize, Serialize};

use salesbook_core::{OwnerId, entity_id};

entity_id!(
    /// CRM lead identifier.
    LeadId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Converted,
    Disqualified,
}

impl LeadStatus {
    /// Still in the pipeline (neither won nor lost).
    pub fn is_open(self) -> bool {
        !matches!(self, LeadStatus::Converted | LeadStatus::Disqualified)
    }
}

/// Lead as read from the CRM; only its estimated value matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: LeadId,
    pub owner_id: OwnerId,
    /// Estimated deal value in smallest currency unit.
    #[serde(default)]
    pub value_minor: u64,
    pub status: LeadStatus,
}
