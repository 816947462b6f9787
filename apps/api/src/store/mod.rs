//! Data access layer. Pure CRUD against Postgres. The ranking pipeline only
//! ever reads candidates/jobs/skills through here and never writes them.

pub mod candidates;
pub mod jobs;
pub mod results;
