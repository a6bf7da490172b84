mod app_config;
mod ses_config;

pub use app_config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, MailConfig, MailTransport, ServerConfig,
    VerificationConfig,
};
pub use ses_config::*;
