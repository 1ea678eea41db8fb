use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::{debug, warn};

use super::claims::Claims;
use super::Session;
use crate::config::JwtConfig;
use crate::state::AppState;

/// Verification half of the JWT settings.
#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from_config(&state.config.jwt)
    }
}

/// Extracts and validates the bearer JWT, yielding the caller's session.
pub struct AuthUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".into()))?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            (StatusCode::UNAUTHORIZED, "invalid or expired token".into())
        })?;

        Ok(AuthUser(Session::new(claims.sub)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::OffsetDateTime;
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    #[derive(Clone)]
    struct TestState {
        jwt: JwtConfig,
    }

    impl FromRef<TestState> for JwtKeys {
        fn from_ref(state: &TestState) -> Self {
            JwtKeys::from_config(&state.jwt)
        }
    }

    fn state() -> TestState {
        TestState {
            jwt: JwtConfig {
                secret: SECRET.into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
            },
        }
    }

    fn token(sub: Uuid, issuer: &str, ttl_secs: i64) -> String {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub,
            iat: now as usize,
            exp: (now + ttl_secs) as usize,
            iss: issuer.into(),
            aud: "test-aud".into(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    async fn extract(header: Option<String>) -> Result<AuthUser, (StatusCode, String)> {
        let mut builder = Request::builder().uri("/api/v1/discover/current");
        if let Some(value) = header {
            builder = builder.header(axum::http::header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &state()).await
    }

    #[tokio::test]
    async fn valid_bearer_token_yields_session() {
        let user_id = Uuid::new_v4();
        let AuthUser(session) = extract(Some(format!("Bearer {}", token(user_id, "test-issuer", 300))))
            .await
            .unwrap_or_else(|(_, msg)| panic!("rejected: {msg}"));
        assert_eq!(session.user_id, user_id);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (status, msg) = extract(None).await.err().unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(msg.contains("missing"));
    }

    #[tokio::test]
    async fn wrong_scheme_is_unauthorized() {
        let (status, msg) = extract(Some("Basic abc".into())).await.err().unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(msg, "invalid auth scheme");
    }

    #[tokio::test]
    async fn foreign_issuer_and_expired_tokens_are_rejected() {
        let user_id = Uuid::new_v4();
        let foreign = extract(Some(format!("Bearer {}", token(user_id, "someone-else", 300)))).await;
        assert!(foreign.is_err());

        let expired = extract(Some(format!("Bearer {}", token(user_id, "test-issuer", -3_600)))).await;
        assert!(expired.is_err());
    }
}
