pub mod email_service;
pub mod verification_service;
