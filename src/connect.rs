use crate::matching::ItemScorer;
use crate::models::{Proposal, Tender};

/// An edge pairing one proposal item with one tender item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: i64,
    pub proposal_item_id: i64,
    pub tender_item_id: i64,
}

/// Validated one-to-one mapping between proposal items and tender items.
/// Each endpoint carries at most one edge; linking over an existing edge
/// replaces it on both sides.
#[derive(Debug)]
pub struct ConnectionSet {
    connections: Vec<Connection>,
    next_id: i64,
}

impl Default for ConnectionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
            next_id: 1,
        }
    }

    pub fn all(&self) -> &[Connection] {
        &self.connections
    }

    pub fn for_proposal_item(&self, proposal_item_id: i64) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.proposal_item_id == proposal_item_id)
    }

    pub fn for_tender_item(&self, tender_item_id: i64) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.tender_item_id == tender_item_id)
    }

    /// Create an edge, dropping any existing edge on either endpoint first.
    /// Returns the new edge's id.
    pub fn link(&mut self, proposal_item_id: i64, tender_item_id: i64) -> i64 {
        self.connections.retain(|c| {
            c.proposal_item_id != proposal_item_id && c.tender_item_id != tender_item_id
        });
        let id = self.next_id;
        self.next_id += 1;
        self.connections.push(Connection {
            id,
            proposal_item_id,
            tender_item_id,
        });
        id
    }

    /// Remove the edge on a proposal item, if any.
    pub fn unlink(&mut self, proposal_item_id: i64) -> Option<Connection> {
        let pos = self
            .connections
            .iter()
            .position(|c| c.proposal_item_id == proposal_item_id)?;
        Some(self.connections.remove(pos))
    }
}

/// Greedily pair proposal items with tender items by descending score.
/// Each tender item is assigned at most once. Returns the connection set
/// together with the score behind every edge.
pub fn auto_link(
    proposal: &Proposal,
    tender: &Tender,
    scorer: &dyn ItemScorer,
) -> (ConnectionSet, Vec<(i64, i64, u32)>) {
    let mut pairs: Vec<(i64, i64, u32)> = Vec::new();
    for p_item in &proposal.items {
        for t_item in &tender.items {
            pairs.push((p_item.id, t_item.id, scorer.score(t_item, p_item)));
        }
    }
    // Stable sort keeps item order as the tie-break.
    pairs.sort_by(|a, b| b.2.cmp(&a.2));

    let mut set = ConnectionSet::new();
    let mut linked = Vec::new();
    for (p_id, t_id, score) in pairs {
        if set.for_proposal_item(p_id).is_none() && set.for_tender_item(t_id).is_none() {
            set.link(p_id, t_id);
            linked.push((p_id, t_id, score));
        }
    }
    (set, linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::SpecScorer;
    use crate::store::Store;

    #[test]
    fn test_link_creates_edge() {
        let mut set = ConnectionSet::new();
        set.link(10, 20);
        assert_eq!(set.all().len(), 1);
        assert_eq!(set.for_proposal_item(10).unwrap().tender_item_id, 20);
        assert_eq!(set.for_tender_item(20).unwrap().proposal_item_id, 10);
    }

    #[test]
    fn test_relink_replaces_on_both_endpoints() {
        let mut set = ConnectionSet::new();
        set.link(10, 20);
        set.link(11, 21);

        // 10 moves to 21: the old 10-20 and 11-21 edges must both go.
        set.link(10, 21);
        assert_eq!(set.all().len(), 1);
        assert_eq!(set.for_proposal_item(10).unwrap().tender_item_id, 21);
        assert!(set.for_proposal_item(11).is_none());
        assert!(set.for_tender_item(20).is_none());
    }

    #[test]
    fn test_at_most_one_edge_per_endpoint() {
        let mut set = ConnectionSet::new();
        for t in [20, 21, 22] {
            set.link(10, t);
        }
        assert_eq!(set.all().len(), 1);
        assert_eq!(set.for_proposal_item(10).unwrap().tender_item_id, 22);
    }

    #[test]
    fn test_edge_ids_are_never_reused() {
        let mut set = ConnectionSet::new();
        let first = set.link(10, 20);
        let second = set.link(10, 21); // replaces, new id
        assert!(second > first);
    }

    #[test]
    fn test_unlink() {
        let mut set = ConnectionSet::new();
        set.link(10, 20);
        let removed = set.unlink(10).unwrap();
        assert_eq!(removed.tender_item_id, 20);
        assert!(set.all().is_empty());
        assert!(set.unlink(10).is_none());
    }

    #[test]
    fn test_auto_link_never_assigns_a_tender_item_twice() {
        let store = Store::seed();
        let tender = store.tender(1).unwrap();
        let proposal = store.proposal(51).unwrap();
        let (set, linked) = auto_link(proposal, tender, &SpecScorer);

        assert_eq!(set.all().len(), 3);
        let mut tender_sides: Vec<i64> = linked.iter().map(|(_, t, _)| *t).collect();
        tender_sides.sort();
        tender_sides.dedup();
        assert_eq!(tender_sides.len(), 3);
    }

    #[test]
    fn test_auto_link_pairs_matching_items() {
        let store = Store::seed();
        let tender = store.tender(1).unwrap();
        let proposal = store.proposal(51).unwrap();
        let (set, _) = auto_link(proposal, tender, &SpecScorer);

        // Identical names and attributes line up one-to-one.
        assert_eq!(set.for_proposal_item(201).unwrap().tender_item_id, 101);
        assert_eq!(set.for_proposal_item(202).unwrap().tender_item_id, 102);
        assert_eq!(set.for_proposal_item(203).unwrap().tender_item_id, 103);
    }
}
