use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_types::region::Region;
use aws_types::SdkConfig;
use lake_core::AwsConfig;
use tracing::info;

/// Shared SDK configuration for the S3, Glue and Athena clients.
///
/// Static keys from the environment win over the default credential chain;
/// a custom endpoint (e.g. LocalStack) applies to every service.
pub async fn load_sdk_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));

    if let Some(endpoint) = aws.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
        loader = loader.endpoint_url(endpoint);
    }

    if let (Some(key_id), Some(secret)) = (&aws.access_key_id, &aws.secret_access_key) {
        let credentials = Credentials::new(key_id, secret, aws.session_token.clone(), None, "nba-lake-env");
        loader = loader.credentials_provider(credentials);
    }

    let sdk_config = loader.load().await;
    info!(
        region = %aws.region,
        endpoint = aws.endpoint_url.as_deref().unwrap_or("(default)"),
        static_credentials = aws.has_static_credentials(),
        "AWS SDK configured"
    );
    sdk_config
}
