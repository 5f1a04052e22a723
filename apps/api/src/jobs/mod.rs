// Job postings and their ranked candidate pipelines.

pub mod handlers;
pub mod pipeline;
