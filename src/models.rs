use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub role: String, // "admin", "user"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tender {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub deadline: String, // "YYYY-MM-DD"
    pub created_by: i64,
    pub status: String,     // "draft", "published", "closed"
    pub visibility: String, // "public", "private"
    pub invited_users: Vec<i64>,
    pub items: Vec<TenderItem>,
    pub processing: Option<TenderProcessing>,
    pub created_at: String,
}

impl Tender {
    pub fn is_public(&self) -> bool {
        self.visibility == "public"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub unit: Option<String>,
    pub estimated_cost: Option<i64>,
    /// Required specs, key -> expected value.
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: i64,
    pub tender_id: i64,
    pub name: String,
    pub description: String,
    pub submitted_by: i64,
    pub company: String,
    pub status: String, // "draft", "submitted", "accepted", "rejected"
    pub items: Vec<ProposalItem>,
    pub total_cost: i64,
    pub processing: Option<ProposalProcessing>,
    pub submitted_at: String,
}

impl Proposal {
    /// Sum of unit cost times quantity over all items.
    pub fn computed_total(&self) -> i64 {
        self.items.iter().map(|i| i.cost * i.quantity).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub cost: i64, // unit cost
    pub quantity: i64,
    /// Tender item this item claims to satisfy.
    pub matched_tender_item: Option<i64>,
    pub match_percentage: Option<u32>,
    pub attributes: HashMap<String, String>,
}

// Step states: "pending", "progress", "completed". A "failed" value exists in
// the original state set but nothing ever produces it; kept for parity.
pub const STEP_PENDING: &str = "pending";
pub const STEP_PROGRESS: &str = "progress";
pub const STEP_COMPLETED: &str = "completed";
#[allow(dead_code)]
pub const STEP_FAILED: &str = "failed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderProcessing {
    pub parsing: String,
    pub signature: String,
    pub extraction: String,
}

impl TenderProcessing {
    pub fn pending() -> Self {
        Self {
            parsing: STEP_PENDING.to_string(),
            signature: STEP_PENDING.to_string(),
            extraction: STEP_PENDING.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalProcessing {
    pub parsing: String,
    pub signature: String,
    pub matching: String,
}

impl ProposalProcessing {
    pub fn pending() -> Self {
        Self {
            parsing: STEP_PENDING.to_string(),
            signature: STEP_PENDING.to_string(),
            matching: STEP_PENDING.to_string(),
        }
    }
}
