//! Server configuration from command line flags and environment variables.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use hostel_backend::domain::auth::DEFAULT_TOKEN_LIFETIME_SECS;
use hostel_backend::domain::{AuthConfig, FeeSchedule};
use hostel_backend::outbound::gateway::GatewayConfig;
use hostel_backend::outbound::mail::MailConfig;
use hostel_backend::outbound::persistence::PoolConfig;

/// Runtime settings; every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "hostel-backend", version, about = "Hostel fee management backend")]
pub struct AppConfig {
    /// Socket address to serve on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum connections in the database pool.
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    pub db_pool_size: u32,

    /// HS256 signing secret for access tokens.
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: String,

    /// Seconds until an issued token expires.
    #[arg(long, env = "TOKEN_LIFETIME_SECS", default_value_t = DEFAULT_TOKEN_LIFETIME_SECS)]
    pub token_lifetime_secs: u64,

    /// Base URL of the payment gateway REST API.
    #[arg(long, env = "GATEWAY_URL", default_value = "https://api.razorpay.com")]
    pub gateway_url: Url,

    /// Gateway public key identifier.
    #[arg(long, env = "GATEWAY_KEY_ID")]
    pub gateway_key_id: String,

    /// Gateway shared secret for basic auth and callback signatures.
    #[arg(long, env = "GATEWAY_KEY_SECRET")]
    pub gateway_key_secret: String,

    /// Send endpoint of the transactional mail API.
    #[arg(long, env = "MAIL_ENDPOINT")]
    pub mail_endpoint: Url,

    /// Bearer key for the mail API.
    #[arg(long, env = "MAIL_API_KEY")]
    pub mail_api_key: String,

    /// Sender address on outgoing email.
    #[arg(long, env = "MAIL_FROM", default_value = "noreply@hostel.local")]
    pub mail_from: String,

    /// Directory for the exported report files.
    #[arg(long, env = "REPORT_DIR", default_value = "reports")]
    pub report_dir: PathBuf,

    /// Flat monthly fee in major currency units.
    #[arg(long, env = "MONTHLY_FEE", default_value_t = 500)]
    pub monthly_fee: i64,

    /// ISO currency code for gateway orders.
    #[arg(long, env = "FEE_CURRENCY", default_value = "INR")]
    pub currency: String,

    /// Password for the seeded admin account.
    #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin123")]
    pub admin_password: String,
}

impl AppConfig {
    /// Token signing configuration.
    pub fn auth(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            token_lifetime_secs: self.token_lifetime_secs,
        }
    }

    /// Fee schedule.
    pub fn fee(&self) -> FeeSchedule {
        FeeSchedule {
            monthly_fee: self.monthly_fee,
            currency: self.currency.clone(),
        }
    }

    /// Gateway adapter configuration.
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.gateway_url.clone(),
            key_id: self.gateway_key_id.clone(),
            key_secret: self.gateway_key_secret.clone(),
            currency: self.currency.clone(),
        }
    }

    /// Mail adapter configuration.
    pub fn mail(&self) -> MailConfig {
        MailConfig {
            endpoint: self.mail_endpoint.clone(),
            api_key: self.mail_api_key.clone(),
            from: self.mail_from.clone(),
        }
    }

    /// Database pool configuration.
    pub fn pool(&self) -> PoolConfig {
        PoolConfig::new(&self.database_url).with_max_size(self.db_pool_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_args() -> Vec<&'static str> {
        vec![
            "hostel-backend",
            "--database-url",
            "postgres://localhost/hostel",
            "--jwt-secret",
            "test-secret",
            "--gateway-key-id",
            "rzp_test_key",
            "--gateway-key-secret",
            "shhh",
            "--mail-endpoint",
            "https://mail.example.com/send",
            "--mail-api-key",
            "mail-key",
        ]
    }

    #[test]
    fn defaults_fill_the_optional_settings() {
        let config = AppConfig::try_parse_from(minimal_args()).expect("parse");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.monthly_fee, 500);
        assert_eq!(config.currency, "INR");
        assert_eq!(config.token_lifetime_secs, DEFAULT_TOKEN_LIFETIME_SECS);
        assert_eq!(config.admin_password, "admin123");
    }

    #[test]
    fn derived_configs_carry_the_parsed_values() {
        let mut args = minimal_args();
        args.extend(["--monthly-fee", "750", "--currency", "EUR"]);
        let config = AppConfig::try_parse_from(args).expect("parse");

        assert_eq!(config.fee().monthly_fee, 750);
        assert_eq!(config.fee().currency, "EUR");
        assert_eq!(config.gateway().currency, "EUR");
        assert_eq!(config.auth().jwt_secret, "test-secret");
    }

    #[test]
    fn a_missing_required_flag_fails_parsing() {
        assert!(AppConfig::try_parse_from(["hostel-backend"]).is_err());
    }
}
