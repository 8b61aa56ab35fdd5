use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub api_base: String,
    pub signature_tolerance_secs: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Relay endpoint the mailer posts to. Unset means mail is logged only.
    pub endpoint: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub public_url: String,
    pub reset_token_ttl_minutes: i64,
    pub jwt: JwtConfig,
    pub stripe: StripeConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let public_url =
            std::env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:8080".into());
        let reset_token_ttl_minutes = std::env::var("RESET_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "trailbook".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "trailbook-clients".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(90),
        };
        let stripe = StripeConfig {
            secret_key: std::env::var("STRIPE_SECRET_KEY")?,
            webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET")?,
            api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".into()),
            signature_tolerance_secs: std::env::var("STRIPE_SIGNATURE_TOLERANCE_SECS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(300),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "usd".into()),
        };
        let mail = MailConfig {
            endpoint: std::env::var("MAIL_ENDPOINT").ok(),
            from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Trailbook <hello@trailbook.example>".into()),
        };
        Ok(Self {
            database_url,
            public_url,
            reset_token_ttl_minutes,
            jwt,
            stripe,
            mail,
        })
    }
}
