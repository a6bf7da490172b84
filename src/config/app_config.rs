use crate::error::{AppError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub verification: VerificationConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Token signing and password hashing parameters. Loaded once at startup.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// Frontend page that receives the code as its last path segment.
    pub base_url: String,
    /// Origins a client may pick its own verification base URL from.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTransport {
    Ses,
    Log,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub sender: String,
    pub aws_region: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let allowed_origins: Vec<String> = env::var("FRONTEND_URL")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", "3000")?,
                max_body_size: parse_var("MAX_BODY_SIZE", "10485760")?,
            },
            database: DatabaseConfig {
                url: env::var("DB_URL")?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", "20")?,
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?,
                token_ttl_hours: parse_var("JWT_EXPIRY_HOURS", "24")?,
                bcrypt_cost: parse_var("BCRYPT_COST", "10")?,
            },
            verification: VerificationConfig {
                base_url: env::var("VERIFY_BASE_URL")
                    .map_err(|_| AppError::ConfigError("VERIFY_BASE_URL not set".to_string()))?,
                allowed_origins: allowed_origins.clone(),
            },
            mail: MailConfig {
                transport: match env::var("MAIL_TRANSPORT")
                    .unwrap_or_else(|_| "ses".to_string())
                    .as_str()
                {
                    "ses" => MailTransport::Ses,
                    "log" => MailTransport::Log,
                    other => {
                        return Err(AppError::ConfigError(format!(
                            "Invalid MAIL_TRANSPORT value: {}",
                            other
                        )));
                    }
                },
                sender: env::var("MAIL_SENDER")
                    .unwrap_or_else(|_| "noreply@example.com".to_string()),
                aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            },
            cors: CorsConfig { allowed_origins },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid {} value", key)))
}
