//! Candidate records: the CV intake pipeline, listings, and review.

pub mod handlers;
pub mod intake;
pub mod service;
