use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{AppConfig, AuthConfig, MailTransport, VerificationConfig},
    database,
    error::{AppError, Result},
    routes,
    services::email_service::{LogMailer, Mailer, SesMailer},
    store::{AccountStore, PgStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub mailer: Arc<dyn Mailer>,
    pub auth: Arc<AuthConfig>,
    pub verification: Arc<VerificationConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AccountStore>,
        mailer: Arc<dyn Mailer>,
        auth: AuthConfig,
        verification: VerificationConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            auth: Arc::new(auth),
            verification: Arc::new(verification),
        }
    }
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;

    let mailer: Arc<dyn Mailer> = match config.mail.transport {
        MailTransport::Ses => {
            let client = crate::config::load_ses_client(&config.mail).await?;
            Arc::new(SesMailer::new(client, config.mail.sender.clone()))
        }
        MailTransport::Log => {
            tracing::warn!("MAIL_TRANSPORT=log, verification emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        mailer,
        config.auth.clone(),
        config.verification.clone(),
    );

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AppError::ConfigError(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_origin(allowed_origins);

    let app = router(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors);

    Ok(app)
}

/// The routed application over `state`, without transport layers.
pub fn router(state: AppState) -> Router {
    routes::create_router(&state)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
