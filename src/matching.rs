use crate::models::{Proposal, ProposalItem, Tender, TenderItem};

/// Scores how well a proposal item satisfies a tender item, 0-100.
/// A strategy trait so tests and future backends can swap the heuristic out.
pub trait ItemScorer {
    fn score(&self, tender_item: &TenderItem, proposal_item: &ProposalItem) -> u32;
}

/// Deterministic default scorer: required-attribute overlap blended with
/// name similarity. A proposal item that cannot cover the required quantity
/// is capped hard regardless of how well its specs read.
pub struct SpecScorer;

const ATTRIBUTE_WEIGHT: f64 = 0.7;
const NAME_WEIGHT: f64 = 0.3;
const QUANTITY_SHORTFALL_CAP: u32 = 50;

impl ItemScorer for SpecScorer {
    fn score(&self, tender_item: &TenderItem, proposal_item: &ProposalItem) -> u32 {
        let name_sim = strsim::jaro_winkler(
            &tender_item.name.to_lowercase(),
            &proposal_item.name.to_lowercase(),
        );

        let blended = if tender_item.attributes.is_empty() {
            name_sim
        } else {
            let matched = tender_item
                .attributes
                .iter()
                .filter(|(key, required)| {
                    proposal_item
                        .attributes
                        .get(*key)
                        .is_some_and(|offered| offered.eq_ignore_ascii_case(required))
                })
                .count();
            let overlap = matched as f64 / tender_item.attributes.len() as f64;
            ATTRIBUTE_WEIGHT * overlap + NAME_WEIGHT * name_sim
        };

        let mut pct = (blended * 100.0).round() as u32;
        pct = pct.min(100);
        if proposal_item.quantity < tender_item.quantity {
            pct = pct.min(QUANTITY_SHORTFALL_CAP);
        }
        pct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Winner,
    RunnerUp,
    Consider,
    Reject,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Winner => "winner",
            Tier::RunnerUp => "runner-up",
            Tier::Consider => "consider",
            Tier::Reject => "reject",
        }
    }
}

/// One row of the recommendation rule table. `None` means "no constraint";
/// `max_rank` and `min_match` must both hold, `below_match` is an exclusive
/// upper bound on the score.
struct TierRule {
    max_rank: Option<usize>,
    min_match: Option<u32>,
    below_match: Option<u32>,
    tier: Tier,
}

// Evaluated top-down, first hit wins. The mix of positional and threshold
// constraints means a rank-3 proposal at 85% hits none of the named rules
// and falls through to the conservative default.
const TIER_RULES: [TierRule; 4] = [
    TierRule { max_rank: Some(2), min_match: Some(90), below_match: None, tier: Tier::Winner },
    TierRule { max_rank: Some(3), min_match: Some(80), below_match: None, tier: Tier::RunnerUp },
    TierRule { max_rank: None, min_match: None, below_match: Some(65), tier: Tier::Reject },
    TierRule { max_rank: None, min_match: None, below_match: None, tier: Tier::Consider },
];

/// `rank` is 1-based position after sorting by overall match.
pub fn assign_tier(rank: usize, overall_match: u32) -> Tier {
    for rule in &TIER_RULES {
        let rank_ok = rule.max_rank.is_none_or(|r| rank <= r);
        let min_ok = rule.min_match.is_none_or(|m| overall_match >= m);
        let below_ok = rule.below_match.is_none_or(|m| overall_match < m);
        if rank_ok && min_ok && below_ok {
            return rule.tier;
        }
    }
    Tier::Consider
}

#[derive(Debug, Clone)]
pub struct ItemScore {
    pub proposal_item_id: i64,
    pub tender_item_id: Option<i64>,
    pub score: u32,
}

#[derive(Debug, Clone)]
pub struct RankedProposal {
    pub proposal_id: i64,
    pub name: String,
    pub company: String,
    pub overall_match: u32,
    pub total_cost: i64,
    pub rank: usize,
    pub tier: Tier,
    pub item_scores: Vec<ItemScore>,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub ranked: Vec<RankedProposal>,
    pub lowest_bid: Option<i64>,
    pub highest_bid: Option<i64>,
    pub avg_match: u32,
    /// Tender item ids no proposal item claims to satisfy.
    pub uncovered_items: Vec<i64>,
}

/// Score each proposal item against the tender item it declares; items with
/// no declared target are scored against their best-fitting tender item.
fn score_items(tender: &Tender, proposal: &Proposal, scorer: &dyn ItemScorer) -> Vec<ItemScore> {
    proposal
        .items
        .iter()
        .map(|item| {
            let declared = item
                .matched_tender_item
                .and_then(|id| tender.items.iter().find(|t| t.id == id));
            match declared {
                Some(target) => ItemScore {
                    proposal_item_id: item.id,
                    tender_item_id: Some(target.id),
                    score: scorer.score(target, item),
                },
                None => {
                    let best = tender
                        .items
                        .iter()
                        .map(|t| (t.id, scorer.score(t, item)))
                        .max_by_key(|(_, s)| *s);
                    ItemScore {
                        proposal_item_id: item.id,
                        tender_item_id: best.map(|(id, _)| id),
                        score: best.map(|(_, s)| s).unwrap_or(0),
                    }
                }
            }
        })
        .collect()
}

fn rounded_mean(values: impl Iterator<Item = u32>) -> u32 {
    let collected: Vec<u32> = values.collect();
    if collected.is_empty() {
        return 0;
    }
    let sum: u32 = collected.iter().sum();
    (sum as f64 / collected.len() as f64).round() as u32
}

/// Rank a tender's proposals and aggregate the bid summary. Sorting is
/// stable: equal overall matches keep their submission order.
pub fn compare(tender: &Tender, proposals: &[&Proposal], scorer: &dyn ItemScorer) -> Comparison {
    let mut ranked: Vec<RankedProposal> = proposals
        .iter()
        .map(|p| {
            let item_scores = score_items(tender, p, scorer);
            let overall_match = rounded_mean(item_scores.iter().map(|s| s.score));
            RankedProposal {
                proposal_id: p.id,
                name: p.name.clone(),
                company: p.company.clone(),
                overall_match,
                total_cost: p.computed_total(),
                rank: 0,
                tier: Tier::Consider,
                item_scores,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.overall_match.cmp(&a.overall_match));
    for (i, entry) in ranked.iter_mut().enumerate() {
        entry.rank = i + 1;
        entry.tier = assign_tier(entry.rank, entry.overall_match);
    }

    let lowest_bid = ranked.iter().map(|r| r.total_cost).min();
    let highest_bid = ranked.iter().map(|r| r.total_cost).max();
    let avg_match = rounded_mean(ranked.iter().map(|r| r.overall_match));

    let uncovered_items = tender
        .items
        .iter()
        .filter(|item| {
            !proposals
                .iter()
                .flat_map(|p| p.items.iter())
                .any(|pi| pi.matched_tender_item == Some(item.id))
        })
        .map(|item| item.id)
        .collect();

    Comparison {
        ranked,
        lowest_bid,
        highest_bid,
        avg_match,
        uncovered_items,
    }
}
