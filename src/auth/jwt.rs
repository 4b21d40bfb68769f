//! JWT token generation and validation
//! Access token + refresh token pattern, each kind signed with its own secret

use crate::{config::SecurityConfig, error::AppError, models::account::Account};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (account ID)
    pub sub: String,

    /// Account role at issue time
    pub role: String,

    /// Token type, always "access"
    pub token_type: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// JWT claims for refresh tokens. No role: each refresh re-reads the account.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Signing/verification keys for one token kind
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT service: token issuer and verifier
pub struct JwtService {
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    access_token_exp_secs: u64,
    refresh_token_exp_secs: u64,
    validation: Validation,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let access_secret = config.access_token_secret.expose_secret();
        let refresh_secret = config.refresh_token_secret.expose_secret();

        // Ensure secrets are at least 32 bytes for HS256
        if access_secret.len() < 32 || refresh_secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }
        if access_secret == refresh_secret {
            return Err(AppError::Config(
                "Access and refresh tokens must use different secrets".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            access_keys: KeyPair::from_secret(access_secret),
            refresh_keys: KeyPair::from_secret(refresh_secret),
            access_token_exp_secs: config.access_token_exp_secs,
            refresh_token_exp_secs: config.refresh_token_exp_secs,
            validation,
        })
    }

    /// Access token lifetime in seconds
    pub fn access_token_exp_secs(&self) -> u64 {
        self.access_token_exp_secs
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_exp_secs(&self) -> u64 {
        self.refresh_token_exp_secs
    }

    /// Generate access token
    pub fn generate_access_token(&self, account: &Account) -> Result<String, AppError> {
        self.generate_access_token_at(account, Utc::now())
    }

    /// Generate access token as if issued at `now`
    pub fn generate_access_token_at(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expiration = now + Duration::seconds(self.access_token_exp_secs as i64);

        let claims = AccessClaims {
            sub: account.id.to_string(),
            role: account.role.to_string(),
            token_type: ACCESS.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.access_keys.encoding).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::Internal(format!("Failed to encode access token: {}", e))
        })
    }

    /// Generate refresh token
    pub fn generate_refresh_token(&self, account: &Account) -> Result<String, AppError> {
        self.generate_refresh_token_at(account, Utc::now())
    }

    /// Generate refresh token as if issued at `now`
    pub fn generate_refresh_token_at(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expiration = now + Duration::seconds(self.refresh_token_exp_secs as i64);

        let claims = RefreshClaims {
            sub: account.id.to_string(),
            token_type: REFRESH.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.refresh_keys.encoding).map_err(|e| {
            tracing::error!("Failed to encode refresh token: {:?}", e);
            AppError::Internal(format!("Failed to encode refresh token: {}", e))
        })
    }

    /// Validate access token. Expiry is reported as `TokenExpired` so clients can refresh.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        let claims = decode::<AccessClaims>(token, &self.access_keys.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Access token expired");
                    AppError::TokenExpired
                }
                _ => {
                    tracing::debug!("Access token validation failed: {:?}", e);
                    AppError::InvalidToken
                }
            })?
            .claims;

        if claims.token_type != ACCESS {
            tracing::debug!("Token type mismatch: expected 'access', got '{}'", claims.token_type);
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }

    /// Validate refresh token specifically
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        let claims = decode::<RefreshClaims>(token, &self.refresh_keys.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!("Refresh token validation failed: {:?}", e);
                AppError::InvalidRefreshToken
            })?
            .claims;

        if claims.token_type != REFRESH {
            tracing::debug!("Token type mismatch: expected 'refresh', got '{}'", claims.token_type);
            return Err(AppError::InvalidRefreshToken);
        }

        Ok(claims)
    }
}
