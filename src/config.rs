use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub subject: String,
    pub ttl_minutes: i64,
}

/// Rules a candidate password must satisfy. Whitespace is rejected
/// regardless of configuration; a zero length bound disables that bound.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_digit: bool,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_non_alphanumeric: bool,
    pub allowed_non_alphanumeric: String,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 0,
            require_digit: true,
            require_uppercase: true,
            require_lowercase: true,
            require_non_alphanumeric: true,
            allowed_non_alphanumeric: "!@#$%^&*()-_=+.?".into(),
        }
    }
}

impl PasswordPolicy {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_length: env_parse("PASSWORD_MIN_LENGTH", defaults.min_length),
            max_length: env_parse("PASSWORD_MAX_LENGTH", defaults.max_length),
            require_digit: env_parse("PASSWORD_REQUIRE_DIGIT", defaults.require_digit),
            require_uppercase: env_parse("PASSWORD_REQUIRE_UPPERCASE", defaults.require_uppercase),
            require_lowercase: env_parse("PASSWORD_REQUIRE_LOWERCASE", defaults.require_lowercase),
            require_non_alphanumeric: env_parse(
                "PASSWORD_REQUIRE_NON_ALPHANUMERIC",
                defaults.require_non_alphanumeric,
            ),
            allowed_non_alphanumeric: std::env::var("PASSWORD_ALLOWED_NON_ALPHANUMERIC")
                .unwrap_or(defaults.allowed_non_alphanumeric),
        }
    }
}

/// Account inserted at startup when no admin exists yet.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultAdmin {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl DefaultAdmin {
    fn from_env() -> Option<Self> {
        let email = std::env::var("DEFAULT_ADMIN_EMAIL").ok()?;
        let username = std::env::var("DEFAULT_ADMIN_USERNAME").ok()?;
        let password = std::env::var("DEFAULT_ADMIN_PASSWORD").ok()?;
        Some(Self {
            email,
            username,
            password,
            first_name: std::env::var("DEFAULT_ADMIN_FIRST_NAME")
                .unwrap_or_else(|_| "Admin".into()),
            last_name: std::env::var("DEFAULT_ADMIN_LAST_NAME")
                .unwrap_or_else(|_| "Account".into()),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub password_policy: PasswordPolicy,
    pub default_admin: Option<DefaultAdmin>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").context("JWT_ISSUER is not set")?,
            audience: std::env::var("JWT_AUDIENCE").context("JWT_AUDIENCE is not set")?,
            subject: std::env::var("JWT_SUBJECT").context("JWT_SUBJECT is not set")?,
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 25),
        };
        Ok(Self {
            database_url,
            jwt,
            password_policy: PasswordPolicy::from_env(),
            default_admin: DefaultAdmin::from_env(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
