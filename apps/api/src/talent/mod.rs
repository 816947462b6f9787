//! Talent pool: free-text candidate search plus recruiter follow-up
//! (comments, meeting scheduling, stored analysis history).

pub mod handlers;
pub mod search;
