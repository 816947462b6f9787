//! Candidate–job compatibility ranking pipeline.
//!
//! Flow: load job + candidate pool → build one prompt per candidate →
//! bounded-concurrency model fan-out → defensive parse → filter by minimum
//! compatibility → sort (score desc, id asc) → truncate to limit.

pub mod engine;
pub mod handlers;
pub mod parser;
pub mod prompts;
