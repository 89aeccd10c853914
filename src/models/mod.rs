pub mod applicant;
pub mod comment;
pub mod user;
