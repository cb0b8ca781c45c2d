use anyhow::{Result, anyhow};
use std::collections::HashMap;

use crate::models::{Proposal, Tender, User};

/// Status filter value that matches every record.
pub const STATUS_ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// created_at, newest first
    Date,
    /// proposal count, highest first
    Proposals,
    /// name, A to Z
    Name,
}

impl SortBy {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "date" => Ok(SortBy::Date),
            "proposals" => Ok(SortBy::Proposals),
            "name" => Ok(SortBy::Name),
            _ => Err(anyhow!(
                "Unknown sort '{}'. Available: date, proposals, name",
                s
            )),
        }
    }
}

#[derive(Debug, Default)]
pub struct TenderQuery<'a> {
    pub text: Option<&'a str>,
    pub status: Option<&'a str>,
    pub sort: Option<SortBy>,
}

/// Filter output. `is_empty` is the empty-state signal for list views.
pub struct Filtered<'a, T> {
    pub items: Vec<&'a T>,
    pub is_empty: bool,
}

/// Access control for tender lists: public tenders are visible to everyone,
/// private ones only to their creator and explicitly invited users.
pub fn tender_visible_to(tender: &Tender, viewer: Option<&User>) -> bool {
    if tender.is_public() {
        return true;
    }
    match viewer {
        Some(user) => tender.created_by == user.id || tender.invited_users.contains(&user.id),
        None => false,
    }
}

fn matches_text(name: &str, description: &str, query: &str) -> bool {
    let q = query.to_lowercase();
    name.to_lowercase().contains(&q) || description.to_lowercase().contains(&q)
}

fn matches_status(status: &str, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(STATUS_ALL) => true,
        Some(s) => status == s,
    }
}

/// Apply visibility, text, and status predicates (AND-combined), then an
/// optional sort. Without a sort the source order is preserved.
pub fn filter_tenders<'a>(
    tenders: &'a [Tender],
    viewer: Option<&User>,
    query: &TenderQuery,
    proposal_counts: &HashMap<i64, usize>,
) -> Filtered<'a, Tender> {
    let mut items: Vec<&Tender> = tenders
        .iter()
        .filter(|t| tender_visible_to(t, viewer))
        .filter(|t| match query.text {
            Some(q) if !q.is_empty() => matches_text(&t.name, &t.description, q),
            _ => true,
        })
        .filter(|t| matches_status(&t.status, query.status))
        .collect();

    if let Some(sort) = query.sort {
        match sort {
            SortBy::Date => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::Proposals => items.sort_by(|a, b| {
                let ca = proposal_counts.get(&a.id).copied().unwrap_or(0);
                let cb = proposal_counts.get(&b.id).copied().unwrap_or(0);
                cb.cmp(&ca)
            }),
            SortBy::Name => {
                items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            }
        }
    }

    let is_empty = items.is_empty();
    Filtered { items, is_empty }
}

/// Proposals are visible to their submitter, the owner of the tender they
/// answer, and admins.
pub fn proposal_visible_to(proposal: &Proposal, viewer: Option<&User>, tenders: &[Tender]) -> bool {
    let Some(user) = viewer else {
        return false;
    };
    if user.role == "admin" || proposal.submitted_by == user.id {
        return true;
    }
    tenders
        .iter()
        .any(|t| t.id == proposal.tender_id && t.created_by == user.id)
}

pub fn filter_proposals<'a>(
    proposals: &'a [Proposal],
    viewer: Option<&User>,
    text: Option<&str>,
    status: Option<&str>,
    tenders: &[Tender],
) -> Filtered<'a, Proposal> {
    let items: Vec<&Proposal> = proposals
        .iter()
        .filter(|p| proposal_visible_to(p, viewer, tenders))
        .filter(|p| match text {
            Some(q) if !q.is_empty() => matches_text(&p.name, &p.description, q),
            _ => true,
        })
        .filter(|p| matches_status(&p.status, status))
        .collect();

    let is_empty = items.is_empty();
    Filtered { items, is_empty }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn counts() -> HashMap<i64, usize> {
        HashMap::new()
    }

    #[test]
    fn test_status_filter_leaves_only_that_status() {
        let store = Store::seed();
        for status in ["published", "draft", "closed"] {
            let query = TenderQuery {
                status: Some(status),
                ..Default::default()
            };
            let result = filter_tenders(store.tenders(), store.user(1), &query, &counts());
            assert!(result.items.iter().all(|t| t.status == status));
        }
    }

    #[test]
    fn test_all_sentinel_is_a_noop() {
        let store = Store::seed();
        let viewer = store.user(1);
        let all = filter_tenders(
            store.tenders(),
            viewer,
            &TenderQuery { status: Some(STATUS_ALL), ..Default::default() },
            &counts(),
        );
        let none = filter_tenders(store.tenders(), viewer, &TenderQuery::default(), &counts());
        assert_eq!(all.items.len(), none.items.len());
    }

    #[test]
    fn test_private_tender_visibility() {
        let store = Store::seed();
        // Tender 3: created by user 1, invited_users = [3].
        let invited = filter_tenders(store.tenders(), store.user(3), &TenderQuery::default(), &counts());
        assert!(invited.items.iter().any(|t| t.id == 3));

        let creator = filter_tenders(store.tenders(), store.user(1), &TenderQuery::default(), &counts());
        assert!(creator.items.iter().any(|t| t.id == 3));

        let outsider = filter_tenders(store.tenders(), store.user(4), &TenderQuery::default(), &counts());
        assert!(!outsider.items.iter().any(|t| t.id == 3));

        let anonymous = filter_tenders(store.tenders(), None, &TenderQuery::default(), &counts());
        assert!(!anonymous.items.iter().any(|t| t.id == 3));
    }

    #[test]
    fn test_text_search_is_case_insensitive_on_name_and_description() {
        let store = Store::seed();
        let query = TenderQuery { text: Some("HARDWARE"), ..Default::default() };
        let result = filter_tenders(store.tenders(), store.user(1), &query, &counts());
        assert!(result.items.iter().any(|t| t.id == 1));

        // "depot extension" only appears in a description.
        let query = TenderQuery { text: Some("depot extension"), ..Default::default() };
        let result = filter_tenders(store.tenders(), store.user(1), &query, &counts());
        assert!(result.items.iter().any(|t| t.id == 2));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let store = Store::seed();
        let with_empty = filter_tenders(
            store.tenders(),
            store.user(1),
            &TenderQuery { text: Some(""), ..Default::default() },
            &counts(),
        );
        let without = filter_tenders(store.tenders(), store.user(1), &TenderQuery::default(), &counts());
        assert_eq!(with_empty.items.len(), without.items.len());
    }

    #[test]
    fn test_no_match_sets_empty_state() {
        let store = Store::seed();
        let query = TenderQuery { text: Some("zzz-no-such-tender"), ..Default::default() };
        let result = filter_tenders(store.tenders(), store.user(1), &query, &counts());
        assert!(result.is_empty);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_unsorted_result_preserves_source_order() {
        let store = Store::seed();
        let result = filter_tenders(store.tenders(), store.user(1), &TenderQuery::default(), &counts());
        let ids: Vec<i64> = result.items.iter().map(|t| t.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted); // seed ids are ascending in source order
    }

    #[test]
    fn test_sort_by_proposal_count_descending() {
        let store = Store::seed();
        let counts = store.proposal_counts();
        let query = TenderQuery { sort: Some(SortBy::Proposals), ..Default::default() };
        let result = filter_tenders(store.tenders(), store.user(1), &query, &counts);
        assert_eq!(result.items[0].id, 1); // three proposals
        assert_eq!(result.items[1].id, 2); // two proposals
    }

    #[test]
    fn test_sort_by_date_newest_first() {
        let store = Store::seed();
        let query = TenderQuery { sort: Some(SortBy::Date), ..Default::default() };
        let result = filter_tenders(store.tenders(), store.user(1), &query, &counts());
        let dates: Vec<&str> = result.items.iter().map(|t| t.created_at.as_str()).collect();
        let mut expected = dates.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_proposal_visibility() {
        let store = Store::seed();
        // Proposal 51: submitted by user 3 against tender 1 (owned by user 1).
        let p = store.proposal(51).unwrap();
        assert!(proposal_visible_to(p, store.user(3), store.tenders()));
        assert!(proposal_visible_to(p, store.user(1), store.tenders()));
        assert!(!proposal_visible_to(p, store.user(4), store.tenders()));
        assert!(!proposal_visible_to(p, None, store.tenders()));
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(SortBy::parse("date").unwrap(), SortBy::Date);
        assert!(SortBy::parse("bogus").is_err());
    }
}
