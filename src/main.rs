mod auth;
mod connect;
mod deadline;
mod filter;
mod matching;
mod models;
mod page;
mod store;
mod wizard;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use filter::{SortBy, TenderQuery};
use matching::SpecScorer;
use models::{ProposalProcessing, TenderProcessing, User};
use page::PageToken;
use store::Store;

#[derive(Parser)]
#[command(name = "procure")]
#[command(about = "Procurement portal - publish tenders, submit proposals, compare bids")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in (mock auth, fixed demo password)
    Login {
        /// Account email
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Log out and clear the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Browse and manage tenders
    Tender {
        #[command(subcommand)]
        command: TenderCommands,
    },

    /// Browse and manage proposals
    Proposal {
        #[command(subcommand)]
        command: ProposalCommands,
    },

    /// Rank a tender's proposals and show the bid summary
    Compare {
        /// Tender ID
        id: i64,
    },

    /// Auto-link a proposal's items to its tender's items
    Connect {
        /// Proposal ID
        id: i64,

        /// Drop the link for these proposal item IDs after auto-linking
        #[arg(long)]
        skip: Vec<i64>,
    },
}

#[derive(Subcommand)]
enum TenderCommands {
    /// List visible tenders
    List {
        /// Free-text search over name and description
        #[arg(short, long)]
        query: Option<String>,

        /// Filter by status (draft, published, closed, all)
        #[arg(short, long)]
        status: Option<String>,

        /// Sort order (date, proposals, name)
        #[arg(long)]
        sort: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Items per page
        #[arg(long, default_value = "6")]
        page_size: usize,
    },

    /// Show tender details
    Show {
        /// Tender ID
        id: i64,
    },

    /// Publish a draft tender (runs the simulated document processing)
    Publish {
        /// Tender ID
        id: i64,
    },

    /// Close a tender to further proposals
    Close {
        /// Tender ID
        id: i64,
    },

    /// Delete a tender
    Delete {
        /// Tender ID
        id: i64,
    },

    /// Invite a user to a private tender
    Invite {
        /// Tender ID
        id: i64,

        /// Email of the user to invite
        email: String,
    },
}

#[derive(Subcommand)]
enum ProposalCommands {
    /// List visible proposals
    List {
        /// Only proposals against this tender
        #[arg(short, long)]
        tender: Option<i64>,

        /// Filter by status (draft, submitted, accepted, rejected, all)
        #[arg(short, long)]
        status: Option<String>,

        /// Free-text search over name and description
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show proposal details
    Show {
        /// Proposal ID
        id: i64,
    },

    /// Submit a draft proposal (runs the simulated document processing)
    Submit {
        /// Proposal ID
        id: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Fresh seed every run; edits live only for this invocation, like a
    // page reload discarding in-memory state. The session file is the one
    // thing that survives.
    let mut store = Store::seed();
    let viewer: Option<User> =
        auth::current_user()?.and_then(|u| store.user(u.id).cloned());

    match cli.command {
        Commands::Login { email, password } => {
            let user = auth::login(&store, &email, &password)?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }

        Commands::Logout => {
            auth::logout()?;
            println!("Logged out.");
        }

        Commands::Whoami => match &viewer {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                if let Some(company) = &user.company {
                    println!("Company: {}", company);
                }
                println!("Role: {}", user.role);
            }
            None => println!("Not logged in."),
        },

        Commands::Tender { command } => match command {
            TenderCommands::List {
                query,
                status,
                sort,
                page,
                page_size,
            } => {
                let sort = sort.as_deref().map(SortBy::parse).transpose()?;
                let tq = TenderQuery {
                    text: query.as_deref(),
                    status: status.as_deref(),
                    sort,
                };
                let counts = store.proposal_counts();
                let filtered = filter::filter_tenders(store.tenders(), viewer.as_ref(), &tq, &counts);
                if filtered.is_empty {
                    println!("No tenders found.");
                } else {
                    let total = page::total_pages(filtered.items.len(), page_size);
                    // Out-of-range page requests fall back silently.
                    let current = page::accept_page(page, total).unwrap_or(1);
                    let paged = page::paginate(&filtered.items, current, page_size);

                    println!(
                        "{:<6} {:<10} {:<12} {:<14} {:<32} {:>6}",
                        "ID", "STATUS", "DEADLINE", "WINDOW", "NAME", "BIDS"
                    );
                    println!("{}", "-".repeat(84));
                    for tender in paged.items {
                        let deadline_label = deadline::classify_str(&tender.deadline)
                            .map(|s| s.label())
                            .unwrap_or("?");
                        println!(
                            "{:<6} {:<10} {:<12} {:<14} {:<32} {:>6}",
                            tender.id,
                            tender.status,
                            tender.deadline,
                            deadline_label,
                            truncate(&tender.name, 30),
                            counts.get(&tender.id).copied().unwrap_or(0)
                        );
                    }
                    println!();
                    println!(
                        "Showing {}-{} of {}, page {} of {}   {}",
                        paged.start_index + 1,
                        paged.start_index + paged.items.len(),
                        paged.total_items,
                        paged.page,
                        paged.total_pages,
                        render_page_strip(paged.page, paged.total_pages)
                    );
                }
            }

            TenderCommands::Show { id } => {
                // Visibility is a hard boundary: a hidden tender looks
                // exactly like a missing one.
                let tender = store
                    .tender(id)
                    .filter(|t| filter::tender_visible_to(t, viewer.as_ref()));
                match tender {
                    Some(tender) => {
                        println!("Tender #{}", tender.id);
                        println!("Name: {}", tender.name);
                        println!("Description: {}", tender.description);
                        let deadline_label = deadline::classify_str(&tender.deadline)
                            .map(|s| s.label())
                            .unwrap_or("?");
                        println!("Deadline: {} ({})", tender.deadline, deadline_label);
                        println!("Status: {}", tender.status);
                        println!("Visibility: {}", tender.visibility);
                        if let Some(owner) = store.user(tender.created_by) {
                            println!("Owner: {}", owner.name);
                        }
                        if !tender.invited_users.is_empty() {
                            let names: Vec<String> = tender
                                .invited_users
                                .iter()
                                .filter_map(|id| store.user(*id))
                                .map(|u| u.name.clone())
                                .collect();
                            println!("Invited: {}", names.join(", "));
                        }
                        if !tender.items.is_empty() {
                            println!("\nItems ({}):", tender.items.len());
                            for item in &tender.items {
                                println!(
                                    "  #{} {} x{} {}",
                                    item.id,
                                    item.name,
                                    item.quantity,
                                    item.unit.as_deref().unwrap_or("")
                                );
                                for (key, value) in &item.attributes {
                                    println!("      {}: {}", key, value);
                                }
                            }
                        }
                        let bids = store.proposals_for_tender(tender.id).len();
                        println!("\nProposals received: {}", bids);
                    }
                    None => println!("Tender #{} not found.", id),
                }
            }

            TenderCommands::Publish { id } => {
                let actor = require_login(&viewer)?;
                let tender = store
                    .tender_mut(id)
                    .ok_or_else(|| anyhow!("Tender #{} not found", id))?;
                if tender.created_by != actor.id && actor.role != "admin" {
                    return Err(anyhow!("Only the tender owner can publish it"));
                }
                if tender.status != "draft" {
                    return Err(anyhow!("Tender #{} is not a draft", id));
                }

                // Walk the creation wizard to its terminal step.
                let mut step = wizard::WizardStep::first();
                loop {
                    println!("[{}]", step.label());
                    if step.is_terminal() {
                        break;
                    }
                    step = step.next();
                }

                let mut processing = TenderProcessing::pending();
                simulate_step("Parsing documents", &mut processing.parsing);
                simulate_step("Checking signatures", &mut processing.signature);
                simulate_step("Extracting requirements", &mut processing.extraction);
                tender.processing = Some(processing);
                tender.status = "published".to_string();
                println!("Tender #{} published. (In-memory only; gone on next run.)", id);
            }

            TenderCommands::Close { id } => {
                let actor = require_login(&viewer)?.clone();
                store.close_tender(id, &actor)?;
                println!("Tender #{} closed.", id);
            }

            TenderCommands::Delete { id } => {
                let actor = require_login(&viewer)?.clone();
                store.delete_tender(id, &actor)?;
                println!("Tender #{} deleted.", id);
            }

            TenderCommands::Invite { id, email } => {
                let actor = require_login(&viewer)?.clone();
                let invitee = store
                    .user_by_email(&email)
                    .ok_or_else(|| anyhow!("No user with email '{}'", email))?
                    .clone();
                store.invite_user(id, &actor, invitee.id)?;
                println!("Invited {} to tender #{}.", invitee.name, id);
            }
        },

        Commands::Proposal { command } => match command {
            ProposalCommands::List {
                tender,
                status,
                query,
            } => {
                let filtered = filter::filter_proposals(
                    store.proposals(),
                    viewer.as_ref(),
                    query.as_deref(),
                    status.as_deref(),
                    store.tenders(),
                );
                let items: Vec<_> = filtered
                    .items
                    .into_iter()
                    .filter(|p| tender.is_none_or(|t| p.tender_id == t))
                    .collect();
                if items.is_empty() {
                    println!("No proposals found.");
                } else {
                    println!(
                        "{:<6} {:<10} {:<8} {:<28} {:<20} {:>12}",
                        "ID", "STATUS", "TENDER", "NAME", "COMPANY", "TOTAL"
                    );
                    println!("{}", "-".repeat(88));
                    for p in items {
                        println!(
                            "{:<6} {:<10} {:<8} {:<28} {:<20} {:>12}",
                            p.id,
                            p.status,
                            format!("#{}", p.tender_id),
                            truncate(&p.name, 26),
                            truncate(&p.company, 18),
                            format!("${}", p.total_cost)
                        );
                    }
                }
            }

            ProposalCommands::Show { id } => {
                let proposal = store.proposal(id).filter(|p| {
                    filter::proposal_visible_to(p, viewer.as_ref(), store.tenders())
                });
                match proposal {
                    Some(p) => {
                        println!("Proposal #{}", p.id);
                        println!("Name: {}", p.name);
                        println!("Description: {}", p.description);
                        println!("Company: {}", p.company);
                        println!("Status: {}", p.status);
                        println!("Against tender: #{}", p.tender_id);
                        println!("Submitted: {}", p.submitted_at);
                        if !p.items.is_empty() {
                            println!("\nItems ({}):", p.items.len());
                            for item in &p.items {
                                let matched = item
                                    .matched_tender_item
                                    .map(|t| format!(" -> tender item #{}", t))
                                    .unwrap_or_default();
                                println!(
                                    "  #{} {} x{} @ ${}{}",
                                    item.id, item.name, item.quantity, item.cost, matched
                                );
                            }
                        }
                        println!("\nTotal: ${}", p.computed_total());
                    }
                    None => println!("Proposal #{} not found.", id),
                }
            }

            ProposalCommands::Submit { id } => {
                let actor = require_login(&viewer)?;
                let today = chrono::Local::now().format("%Y-%m-%d").to_string();
                let proposal = store
                    .proposal_mut(id)
                    .ok_or_else(|| anyhow!("Proposal #{} not found", id))?;
                if proposal.submitted_by != actor.id {
                    return Err(anyhow!("Only the proposal author can submit it"));
                }
                if proposal.status != "draft" {
                    return Err(anyhow!("Proposal #{} is not a draft", id));
                }

                let mut processing = ProposalProcessing::pending();
                simulate_step("Parsing documents", &mut processing.parsing);
                simulate_step("Checking signatures", &mut processing.signature);
                simulate_step("Matching items", &mut processing.matching);
                proposal.processing = Some(processing);
                proposal.status = "submitted".to_string();
                proposal.submitted_at = today;
                proposal.total_cost = proposal.computed_total();
                println!("Proposal #{} submitted. (In-memory only; gone on next run.)", id);
            }
        },

        Commands::Compare { id } => {
            let tender = store
                .tender(id)
                .filter(|t| filter::tender_visible_to(t, viewer.as_ref()))
                .ok_or_else(|| anyhow!("Tender #{} not found", id))?;
            let proposals: Vec<_> = store
                .proposals_for_tender(id)
                .into_iter()
                .filter(|p| p.status != "draft")
                .collect();
            if proposals.is_empty() {
                println!("No proposals to compare for tender #{}.", id);
                return Ok(());
            }

            let cmp = matching::compare(tender, &proposals, &SpecScorer);

            println!("Comparison for tender #{}: {}", tender.id, tender.name);
            println!();
            println!(
                "{:<5} {:<6} {:<26} {:<20} {:>6} {:>12}  {:<10}",
                "RANK", "ID", "PROPOSAL", "COMPANY", "MATCH", "TOTAL", "TIER"
            );
            println!("{}", "-".repeat(92));
            for entry in &cmp.ranked {
                println!(
                    "{:<5} {:<6} {:<26} {:<20} {:>5}% {:>12}  {:<10}",
                    entry.rank,
                    entry.proposal_id,
                    truncate(&entry.name, 24),
                    truncate(&entry.company, 18),
                    entry.overall_match,
                    format!("${}", entry.total_cost),
                    entry.tier.label()
                );
                for score in &entry.item_scores {
                    let target = score
                        .tender_item_id
                        .and_then(|t| tender.items.iter().find(|i| i.id == t))
                        .map(|i| i.name.as_str())
                        .unwrap_or("(no tender item)");
                    println!(
                        "      item #{} -> {}: {}%",
                        score.proposal_item_id, target, score.score
                    );
                }
            }

            println!();
            if let (Some(low), Some(high)) = (cmp.lowest_bid, cmp.highest_bid) {
                println!("Lowest bid:  ${}", low);
                println!("Highest bid: ${}", high);
            }
            println!("Average match: {}%", cmp.avg_match);

            if !cmp.uncovered_items.is_empty() {
                println!("\nNot covered by any proposal:");
                for item_id in &cmp.uncovered_items {
                    if let Some(item) = tender.items.iter().find(|i| i.id == *item_id) {
                        println!("  #{} {}", item.id, item.name);
                    }
                }
            }
        }

        Commands::Connect { id, skip } => {
            let proposal = store
                .proposal(id)
                .filter(|p| filter::proposal_visible_to(p, viewer.as_ref(), store.tenders()))
                .ok_or_else(|| anyhow!("Proposal #{} not found", id))?;
            let tender = store
                .tender(proposal.tender_id)
                .ok_or_else(|| anyhow!("Tender #{} not found", proposal.tender_id))?;

            let (mut set, mut linked) = connect::auto_link(proposal, tender, &SpecScorer);
            for p_id in &skip {
                if set.unlink(*p_id).is_some() {
                    linked.retain(|(p, _, _)| p != p_id);
                }
            }
            if linked.is_empty() {
                println!("Nothing to link.");
                return Ok(());
            }

            println!("Item links for proposal #{} against tender #{}:", proposal.id, tender.id);
            for (p_id, t_id, score) in &linked {
                let edge = set.for_proposal_item(*p_id).map(|c| c.id).unwrap_or(0);
                let p_name = proposal
                    .items
                    .iter()
                    .find(|i| i.id == *p_id)
                    .map(|i| i.name.as_str())
                    .unwrap_or("?");
                let t_name = tender
                    .items
                    .iter()
                    .find(|i| i.id == *t_id)
                    .map(|i| i.name.as_str())
                    .unwrap_or("?");
                println!("  [{}] {} -> {} ({}%)", edge, p_name, t_name, score);
            }
            for item in &proposal.items {
                if set.for_proposal_item(item.id).is_none() {
                    println!("  {} -> (unlinked)", item.name);
                }
            }
            println!("{} link(s).", set.all().len());
        }
    }

    Ok(())
}

fn require_login<'a>(viewer: &'a Option<User>) -> Result<&'a User> {
    viewer
        .as_ref()
        .ok_or_else(|| anyhow!("Not logged in. Run 'procure login <email> --password <pw>' first."))
}

/// Canned processing step: flips pending -> progress -> completed with a
/// fixed delay. Never fails, cannot be cancelled.
fn simulate_step(label: &str, state: &mut String) {
    *state = models::STEP_PROGRESS.to_string();
    print!("{}... ", label);
    use std::io::Write;
    let _ = std::io::stdout().flush();
    std::thread::sleep(std::time::Duration::from_millis(400));
    *state = models::STEP_COMPLETED.to_string();
    println!("done");
}

fn render_page_strip(current: usize, total_pages: usize) -> String {
    page::page_window(current, total_pages, 1)
        .iter()
        .map(|token| match token {
            PageToken::Page(p) if *p == current => format!("[{}]", p),
            PageToken::Page(p) => p.to_string(),
            PageToken::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_page_strip_marks_current_page() {
        assert_eq!(render_page_strip(2, 3), "1 [2] 3");
        assert_eq!(render_page_strip(5, 10), "1 ... 4 [5] 6 ... 10");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long tender name", 10), "a long ...");
    }
}
