pub mod candidate;
pub mod company;
pub mod job_role;
pub mod user;
