use anyhow::{Result, anyhow};
use std::collections::HashMap;

use crate::models::{Proposal, ProposalItem, Tender, TenderItem, User};

/// In-memory entity store. Seeded fresh on every run; nothing written back.
/// Lookups are linear scans over flat vectors.
pub struct Store {
    users: Vec<User>,
    tenders: Vec<Tender>,
    proposals: Vec<Proposal>,
}

impl Store {
    pub fn seed() -> Self {
        Self {
            users: seed_users(),
            tenders: seed_tenders(),
            proposals: seed_proposals(),
        }
    }

    // --- User lookups ---

    pub fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    // --- Tender lookups ---

    pub fn tenders(&self) -> &[Tender] {
        &self.tenders
    }

    pub fn tender(&self, id: i64) -> Option<&Tender> {
        self.tenders.iter().find(|t| t.id == id)
    }

    pub fn tender_mut(&mut self, id: i64) -> Option<&mut Tender> {
        self.tenders.iter_mut().find(|t| t.id == id)
    }

    // --- Proposal lookups ---

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn proposal(&self, id: i64) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    pub fn proposal_mut(&mut self, id: i64) -> Option<&mut Proposal> {
        self.proposals.iter_mut().find(|p| p.id == id)
    }

    pub fn proposals_for_tender(&self, tender_id: i64) -> Vec<&Proposal> {
        self.proposals
            .iter()
            .filter(|p| p.tender_id == tender_id)
            .collect()
    }

    /// Proposal counts per tender, for the proposal-count sort.
    pub fn proposal_counts(&self) -> HashMap<i64, usize> {
        let mut counts = HashMap::new();
        for p in &self.proposals {
            *counts.entry(p.tender_id).or_insert(0) += 1;
        }
        counts
    }

    // --- Owner-only mutations ---

    pub fn delete_tender(&mut self, id: i64, actor: &User) -> Result<()> {
        let tender = self
            .tender(id)
            .ok_or_else(|| anyhow!("Tender #{} not found", id))?;
        ensure_owner(tender, actor)?;
        self.tenders.retain(|t| t.id != id);
        Ok(())
    }

    pub fn close_tender(&mut self, id: i64, actor: &User) -> Result<()> {
        let tender = self
            .tender_mut(id)
            .ok_or_else(|| anyhow!("Tender #{} not found", id))?;
        ensure_owner(tender, actor)?;
        tender.status = "closed".to_string();
        Ok(())
    }

    pub fn invite_user(&mut self, tender_id: i64, actor: &User, user_id: i64) -> Result<()> {
        if self.user(user_id).is_none() {
            return Err(anyhow!("User #{} not found", user_id));
        }
        let tender = self
            .tender_mut(tender_id)
            .ok_or_else(|| anyhow!("Tender #{} not found", tender_id))?;
        ensure_owner(tender, actor)?;
        if !tender.invited_users.contains(&user_id) {
            tender.invited_users.push(user_id);
        }
        Ok(())
    }
}

fn ensure_owner(tender: &Tender, actor: &User) -> Result<()> {
    if tender.created_by == actor.id || actor.role == "admin" {
        Ok(())
    } else {
        Err(anyhow!("Only the tender owner can do that"))
    }
}

// --- Seed fixtures ---
// Static mock data standing in for a backend. Deadlines are fixed dates, so
// classifications drift as the calendar advances; tests pin "today" instead.

fn seed_users() -> Vec<User> {
    vec![
        user(1, "avery@citymetro.gov", "Avery Cole", Some("City Metro Authority"), "admin"),
        user(2, "maria@nordbuild.com", "Maria Lindqvist", Some("NordBuild AB"), "user"),
        user(3, "james@helixsupply.io", "James Okafor", Some("Helix Supply"), "user"),
        user(4, "priya@quantaparts.com", "Priya Sharma", Some("Quanta Parts"), "user"),
        user(5, "tom@freelance.net", "Tom Weiss", None, "user"),
    ]
}

fn user(id: i64, email: &str, name: &str, company: Option<&str>, role: &str) -> User {
    User {
        id,
        email: email.to_string(),
        name: name.to_string(),
        company: company.map(str::to_string),
        role: role.to_string(),
    }
}

fn seed_tenders() -> Vec<Tender> {
    vec![
        Tender {
            items: vec![
                TenderItem {
                    id: 101,
                    name: "Office laptop".to_string(),
                    description: "Standard issue developer laptop".to_string(),
                    quantity: 40,
                    unit: Some("unit".to_string()),
                    estimated_cost: Some(1400),
                    attributes: attrs(&[("ram", "32GB"), ("storage", "1TB"), ("os", "linux")]),
                },
                TenderItem {
                    id: 102,
                    name: "Docking station".to_string(),
                    description: "USB-C dock, dual display".to_string(),
                    quantity: 40,
                    unit: Some("unit".to_string()),
                    estimated_cost: Some(180),
                    attributes: attrs(&[("ports", "usb-c"), ("displays", "2")]),
                },
                TenderItem {
                    id: 103,
                    name: "Monitor".to_string(),
                    description: "27 inch IPS monitor".to_string(),
                    quantity: 80,
                    unit: Some("unit".to_string()),
                    estimated_cost: Some(320),
                    attributes: attrs(&[("size", "27\""), ("panel", "IPS")]),
                },
            ],
            ..tender(1, "IT Hardware Refresh 2026", "Workstations and peripherals for the engineering department", "2026-09-30", 1, "published", "public", "2026-07-01")
        },
        Tender {
            items: vec![TenderItem {
                id: 104,
                name: "Structural steel beams".to_string(),
                description: "S355 grade, delivered to site".to_string(),
                quantity: 120,
                unit: Some("tonne".to_string()),
                estimated_cost: Some(900),
                attributes: attrs(&[("grade", "S355"), ("length", "12m")]),
            }],
            ..tender(2, "Riverside Depot Extension", "Structural steel package for the depot extension", "2026-08-28", 2, "published", "public", "2026-07-03")
        },
        Tender {
            invited_users: vec![3],
            items: vec![TenderItem {
                id: 105,
                name: "Track ballast".to_string(),
                description: "Crushed granite ballast, 31.5/50mm".to_string(),
                quantity: 5000,
                unit: Some("tonne".to_string()),
                estimated_cost: Some(35),
                attributes: attrs(&[("gradation", "31.5/50"), ("rock", "granite")]),
            }],
            ..tender(3, "Ballast Supply (Invited)", "Restricted ballast supply contract, invited suppliers only", "2026-10-15", 1, "published", "private", "2026-07-05")
        },
        tender(4, "Fleet Tyre Replacement", "Annual tyre replacement for the bus fleet", "2026-06-01", 1, "published", "public", "2026-04-20"),
        tender(5, "Canteen Catering Services", "Two-year catering contract for three staff canteens", "2026-12-10", 2, "published", "public", "2026-07-08"),
        tender(6, "Signalling Spares", "Relay and interlocking spares, draft scope", "2026-11-01", 1, "draft", "public", "2026-07-10"),
        tender(7, "Uniform Procurement 2025", "Closed last year's uniform contract", "2025-10-01", 1, "closed", "public", "2025-08-01"),
        tender(8, "Executive Travel Frame", "Private travel framework, no suppliers invited yet", "2026-10-20", 2, "published", "private", "2026-07-12"),
        tender(9, "Depot Cleaning Contract", "Daily cleaning across four depots", "2026-09-02", 1, "published", "public", "2026-07-14"),
        tender(10, "Workshop Hand Tools", "Replenishment of calibrated hand tools", "2026-11-18", 2, "published", "public", "2026-07-15"),
        tender(11, "CCTV Upgrade Phase 2", "Camera and storage upgrade for 12 stations", "2026-12-01", 1, "published", "public", "2026-07-18"),
        tender(12, "Winter Gritting Services", "On-call gritting for park-and-ride sites", "2026-10-30", 2, "published", "public", "2026-07-20"),
        tender(13, "Printed Timetables Q4", "Print run for the Q4 timetable change", "2026-08-26", 1, "published", "public", "2026-07-22"),
        tender(14, "Waste Collection Renewal", "General and hazardous waste collection", "2027-01-15", 2, "published", "public", "2026-07-25"),
        tender(15, "Lift and Escalator Parts", "OEM and compatible spares", "2026-12-20", 1, "published", "public", "2026-07-26"),
        tender(16, "Office Furniture Batch 3", "Desks and chairs for the new annex", "2026-11-05", 2, "published", "public", "2026-07-28"),
    ]
}

fn tender(
    id: i64,
    name: &str,
    description: &str,
    deadline: &str,
    created_by: i64,
    status: &str,
    visibility: &str,
    created_at: &str,
) -> Tender {
    Tender {
        id,
        name: name.to_string(),
        description: description.to_string(),
        deadline: deadline.to_string(),
        created_by,
        status: status.to_string(),
        visibility: visibility.to_string(),
        invited_users: vec![],
        items: vec![],
        processing: None,
        created_at: created_at.to_string(),
    }
}

fn seed_proposals() -> Vec<Proposal> {
    let mut proposals = vec![
        Proposal {
            items: vec![
                ProposalItem {
                    id: 201,
                    name: "Office laptop".to_string(),
                    description: "ThinkPad-class workstation".to_string(),
                    cost: 1350,
                    quantity: 40,
                    matched_tender_item: Some(101),
                    match_percentage: None,
                    attributes: attrs(&[("ram", "32GB"), ("storage", "1TB"), ("os", "linux")]),
                },
                ProposalItem {
                    id: 202,
                    name: "Docking station".to_string(),
                    description: "Dual-display USB-C dock".to_string(),
                    cost: 165,
                    quantity: 40,
                    matched_tender_item: Some(102),
                    match_percentage: None,
                    attributes: attrs(&[("ports", "usb-c"), ("displays", "2")]),
                },
                ProposalItem {
                    id: 203,
                    name: "Monitor 27\"".to_string(),
                    description: "27 inch IPS, height adjustable".to_string(),
                    cost: 290,
                    quantity: 80,
                    matched_tender_item: Some(103),
                    match_percentage: None,
                    attributes: attrs(&[("size", "27\""), ("panel", "IPS")]),
                },
            ],
            ..proposal(51, 1, "Helix full-package bid", "Complete hardware package with on-site rollout", 3, "Helix Supply", "submitted", "2026-07-20")
        },
        Proposal {
            items: vec![
                ProposalItem {
                    id: 204,
                    name: "Business laptop".to_string(),
                    description: "Mid-range business laptop".to_string(),
                    cost: 1100,
                    quantity: 40,
                    matched_tender_item: Some(101),
                    match_percentage: None,
                    attributes: attrs(&[("ram", "16GB"), ("storage", "512GB"), ("os", "linux")]),
                },
                ProposalItem {
                    id: 205,
                    name: "Monitor".to_string(),
                    description: "27 inch VA monitor".to_string(),
                    cost: 240,
                    quantity: 80,
                    matched_tender_item: Some(103),
                    match_percentage: None,
                    attributes: attrs(&[("size", "27\""), ("panel", "VA")]),
                },
            ],
            ..proposal(52, 1, "Quanta value bid", "Cost-optimized alternative, no docking stations", 4, "Quanta Parts", "submitted", "2026-07-22")
        },
        Proposal {
            items: vec![ProposalItem {
                id: 206,
                name: "Refurbished laptops".to_string(),
                description: "Refurbished units, mixed specs".to_string(),
                cost: 620,
                quantity: 40,
                matched_tender_item: Some(101),
                match_percentage: None,
                attributes: attrs(&[("ram", "8GB"), ("storage", "256GB"), ("os", "windows")]),
            }],
            ..proposal(53, 1, "Budget refurb offer", "Refurbished stock with 12-month warranty", 5, "Weiss Trading", "submitted", "2026-07-25")
        },
        Proposal {
            items: vec![ProposalItem {
                id: 207,
                name: "S355 beams".to_string(),
                description: "S355 structural beams, 12m lengths".to_string(),
                cost: 870,
                quantity: 120,
                matched_tender_item: Some(104),
                match_percentage: None,
                attributes: attrs(&[("grade", "S355"), ("length", "12m")]),
            }],
            ..proposal(54, 2, "NordBuild steel bid", "Mill-direct steel with site delivery", 4, "Quanta Parts", "submitted", "2026-07-28")
        },
        proposal(55, 2, "Draft steel outline", "Unsubmitted outline bid", 3, "Helix Supply", "draft", "2026-07-29"),
    ];
    for p in &mut proposals {
        p.total_cost = p.computed_total();
    }
    proposals
}

fn proposal(
    id: i64,
    tender_id: i64,
    name: &str,
    description: &str,
    submitted_by: i64,
    company: &str,
    status: &str,
    submitted_at: &str,
) -> Proposal {
    Proposal {
        id,
        tender_id,
        name: name.to_string(),
        description: description.to_string(),
        submitted_by,
        company: company.to_string(),
        status: status.to_string(),
        items: vec![],
        total_cost: 0,
        processing: None,
        submitted_at: submitted_at.to_string(),
    }
}

fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
