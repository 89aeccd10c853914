pub mod applicant_service;
pub mod comment_service;
pub mod memory_store;
pub mod user_service;
