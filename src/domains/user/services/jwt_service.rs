use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::domains::user::dto::{Claims, TokenKind, TokenPair};
use crate::shared::error::AppError;
use crate::shared::utils::date_util::{DateUtil, Duration};
use crate::system::config::AuthConfig;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Expected a {expected:?} token")]
    WrongTokenType { expected: TokenKind },
}

impl From<JwtError> for AppError {
    fn from(error: JwtError) -> Self {
        match error {
            JwtError::TokenCreation(message) => AppError::Internal(message),
            _ => AppError::Unauthorized("Unauthorized".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

impl From<&AuthConfig> for JwtConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }
}

pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Mint an access/refresh pair carrying the user's id and email.
    pub fn issue_pair(&self, user_id: &str, email: &str) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.sign(user_id, email, TokenKind::Access)?,
            refresh_token: self.sign(user_id, email, TokenKind::Refresh)?,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify(token, TokenKind::Refresh)
    }

    fn sign(&self, user_id: &str, email: &str, kind: TokenKind) -> Result<String, JwtError> {
        let ttl = match kind {
            TokenKind::Access => self.config.access_token_ttl,
            TokenKind::Refresh => self.config.refresh_token_ttl,
        };

        let now = DateUtil::now();
        let expires_at = DateUtil::add_duration(&now, ttl)
            .ok_or_else(|| JwtError::TokenCreation("token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: DateUtil::to_timestamp(&now),
            exp: DateUtil::to_timestamp(&expires_at),
            jti: Uuid::new_v4().to_string(),
            typ: kind,
        };

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenCreation(e.to_string()))
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken(e.to_string()),
            })?;

        let claims = token_data.claims;
        if claims.typ != expected {
            return Err(JwtError::WrongTokenType { expected });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            algorithm: Algorithm::HS256,
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
        }
    }

    fn create_test_jwt_service() -> JwtService {
        JwtService::new(create_test_config("test-secret-key"))
    }

    fn signed(service: &JwtService, claims: &Claims) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &service.encoding_key).unwrap()
    }

    #[test]
    fn test_pair_carries_identity_claims() {
        let jwt_service = create_test_jwt_service();
        let pair = jwt_service.issue_pair("user-1", "a@b.com").unwrap();

        let access = jwt_service.verify_access_token(&pair.access_token).unwrap();
        assert_eq!(access.sub, "user-1");
        assert_eq!(access.email, "a@b.com");
        assert_eq!(access.exp - access.iat, 15 * 60);

        let refresh = jwt_service.verify_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, "user-1");
        assert_eq!(refresh.email, "a@b.com");
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_consecutive_pairs_differ() {
        let jwt_service = create_test_jwt_service();
        let first = jwt_service.issue_pair("user-1", "a@b.com").unwrap();
        let second = jwt_service.issue_pair("user-1", "a@b.com").unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let jwt_service = create_test_jwt_service();
        let pair = jwt_service.issue_pair("user-1", "a@b.com").unwrap();

        assert!(matches!(
            jwt_service.verify_access_token(&pair.refresh_token),
            Err(JwtError::WrongTokenType { .. })
        ));
        assert!(matches!(
            jwt_service.verify_refresh_token(&pair.access_token),
            Err(JwtError::WrongTokenType { .. })
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt_service = create_test_jwt_service();
        let now = DateUtil::to_timestamp(&DateUtil::now());
        let claims = Claims {
            sub: "user-1".into(),
            email: "a@b.com".into(),
            iat: now - 7200,
            exp: now - 3600,
            jti: "jti".into(),
            typ: TokenKind::Refresh,
        };

        let token = signed(&jwt_service, &claims);
        assert!(matches!(
            jwt_service.verify_refresh_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_forged_tokens_are_rejected() {
        let jwt_service = create_test_jwt_service();
        let forger = JwtService::new(create_test_config("someone-elses-secret"));
        let forged = forger.issue_pair("user-1", "a@b.com").unwrap();
        assert!(jwt_service.verify_refresh_token(&forged.refresh_token).is_err());

        // Payload of one token under the signature of another
        let genuine = jwt_service.issue_pair("user-1", "a@b.com").unwrap();
        let other = jwt_service.issue_pair("admin-1", "admin@b.com").unwrap();
        let genuine_parts: Vec<&str> = genuine.refresh_token.split('.').collect();
        let other_parts: Vec<&str> = other.refresh_token.split('.').collect();
        let spliced = format!("{}.{}.{}", genuine_parts[0], other_parts[1], genuine_parts[2]);
        assert!(matches!(
            jwt_service.verify_refresh_token(&spliced),
            Err(JwtError::InvalidToken(_))
        ));

        assert!(jwt_service.verify_refresh_token("not.a.jwt").is_err());
        assert!(jwt_service.verify_refresh_token("").is_err());
    }

    #[test]
    fn test_errors_map_to_unauthorized() {
        let error: AppError = JwtError::TokenExpired.into();
        assert!(matches!(error, AppError::Unauthorized(_)));

        let error: AppError = JwtError::TokenCreation("boom".into()).into();
        assert!(matches!(error, AppError::Internal(_)));
    }
}
