pub mod email_queries;
pub mod user_queries;
