pub mod clock;
pub mod topic;
