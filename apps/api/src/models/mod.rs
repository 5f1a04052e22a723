pub mod application;
pub mod candidate;
pub mod job;

pub use application::{ApplicationRow, ApplicationStatus, ScoreVector, TransitionError};
pub use candidate::CandidateRow;
pub use job::{JobRow, JobStatus};
