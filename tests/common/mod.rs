#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use account_service::{
    AppState,
    app,
    config::{AuthConfig, VerificationConfig},
    error::{AppError, Result},
    models::OutgoingEmail,
    services::email_service::Mailer,
    store::MemoryStore,
};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const VERIFY_BASE_URL: &str = "https://app.example.com/verify";
pub const JWT_SECRET: &str = "integration-secret";

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    /// While set, sends are rejected and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Verification code from the most recent message sent to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        let prefix = format!("{}/", VERIFY_BASE_URL);
        self.sent()
            .iter()
            .rev()
            .find(|email| email.to == to)
            .and_then(|email| {
                let start = email.html.find(&prefix)? + prefix.len();
                let code: String = email.html[start..]
                    .chars()
                    .take_while(|c| c.is_ascii_hexdigit())
                    .collect();
                Some(code)
            })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DeliveryError("relay unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<()> {
        Err(AppError::DeliveryError("relay unavailable".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub auth: AuthConfig,
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: JWT_SECRET.to_string(),
        token_ttl_hours: 24,
        bcrypt_cost: 4,
    }
}

pub fn test_app(mailer: Arc<dyn Mailer>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        mailer,
        auth_config(),
        VerificationConfig {
            base_url: VERIFY_BASE_URL.to_string(),
            allowed_origins: vec!["https://app.example.com".to_string()],
        },
    );

    TestApp {
        router: app::router(state),
        store,
        auth: auth_config(),
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, payload))
    }

    pub async fn register(&self, email: &str, password: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.request(
            "POST",
            "/users",
            None,
            Some(json!({
                "email": email,
                "password": password,
                "first_name": "Ada",
                "last_name": "Lovelace",
                "country": "UK",
                "image": null
            })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.request(
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers, verifies and logs in, returning the account id and token.
    pub async fn verified_user(
        &self,
        mailer: &RecordingMailer,
        email: &str,
        password: &str,
    ) -> anyhow::Result<(i64, String)> {
        let (status, body) = self.register(email, password).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {body}");
        let id = body["id"].as_i64().unwrap_or_default();

        let code = mailer
            .last_code_for(email)
            .ok_or_else(|| anyhow::anyhow!("no verification mail for {email}"))?;
        let (status, _) = self
            .request("GET", &format!("/users/verify/{}", code), None, None)
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "verification failed");

        let (status, body) = self.login(email, password).await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {body}");
        let token = body["token"].as_str().unwrap_or_default().to_string();

        Ok((id, token))
    }
}
