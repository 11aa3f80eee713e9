use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateStatus;
use crate::models::user::{User, UserRole, UserView};
use crate::store::{StatusCount, Store};

/// Size of the "top recruiters" view.
pub const TOP_RECRUITERS_LIMIT: usize = 3;

/// A recruiter with statistics derived from their uploads at read time.
#[derive(Debug, Clone, Serialize)]
pub struct RecruiterView {
    #[serde(flatten)]
    pub user: UserView,
    pub uploaded_cvs: i64,
    pub shortlisted_candidates: i64,
    pub selected_candidates: i64,
    pub accuracy: f64,
    pub status: &'static str,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Tally {
    uploaded: i64,
    shortlisted: i64,
    selected: i64,
}

/// Percentage of shortlisted candidates that were selected, to 2 decimals.
pub fn accuracy(selected: i64, shortlisted: i64) -> f64 {
    if shortlisted <= 0 {
        return 0.0;
    }
    let ratio = selected as f64 / shortlisted as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

fn tally(counts: Vec<StatusCount>) -> HashMap<Uuid, Tally> {
    let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
    for StatusCount {
        recruiter_id,
        status,
        count,
    } in counts
    {
        let entry = tallies.entry(recruiter_id).or_default();
        entry.uploaded += count;
        if status.is_shortlisted() {
            entry.shortlisted += count;
        }
        if status == CandidateStatus::Selected {
            entry.selected += count;
        }
    }
    tallies
}

fn view(user: &User, tally: Tally) -> RecruiterView {
    RecruiterView {
        user: UserView::from(user),
        uploaded_cvs: tally.uploaded,
        shortlisted_candidates: tally.shortlisted,
        selected_candidates: tally.selected,
        accuracy: accuracy(tally.selected, tally.shortlisted),
        status: if user.is_active { "Active" } else { "Inactive" },
    }
}

/// Recruiters of the caller's tenant, in signup order.
pub async fn list_recruiters(store: &dyn Store, caller: &User) -> Result<Vec<RecruiterView>, AppError> {
    let recruiters = store
        .list_users_by_role(caller.company_id, UserRole::Recruiter)
        .await?;
    let ids: Vec<Uuid> = recruiters.iter().map(|u| u.id).collect();
    let tallies = tally(store.count_candidates_by_recruiter(&ids).await?);

    Ok(recruiters
        .iter()
        .map(|user| view(user, tallies.get(&user.id).copied().unwrap_or_default()))
        .collect())
}

/// The three most accurate recruiters; ties keep signup order.
pub async fn top_recruiters(store: &dyn Store, caller: &User) -> Result<Vec<RecruiterView>, AppError> {
    let mut recruiters = list_recruiters(store, caller).await?;
    recruiters.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy));
    recruiters.truncate(TOP_RECRUITERS_LIMIT);
    Ok(recruiters)
}
