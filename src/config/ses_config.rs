use aws_config::{BehaviorVersion, Region};
use aws_sdk_sesv2::{Client as SesClient, config::Credentials};

use crate::{
    config::MailConfig,
    error::{AppError, Result},
};

pub async fn load_ses_client(mail: &MailConfig) -> Result<SesClient> {
    let aws_access_key = std::env::var("AWS_ACCESS_KEY_ID")
        .map_err(|_| AppError::ConfigError("AWS_ACCESS_KEY_ID not set".to_string()))?;

    let aws_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY")
        .map_err(|_| AppError::ConfigError("AWS_SECRET_ACCESS_KEY not set".to_string()))?;

    let credentials = Credentials::new(
        aws_access_key,
        aws_secret_key,
        None,
        None,
        "env-credentials",
    );

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(mail.aws_region.clone()))
        .credentials_provider(credentials)
        .load()
        .await;

    let ses_client = SesClient::new(&config);

    tracing::info!("AWS SES client initialized in {}", mail.aws_region);

    Ok(ses_client)
}
