pub mod applicant_dto;
pub mod comment_dto;
pub mod user_dto;
