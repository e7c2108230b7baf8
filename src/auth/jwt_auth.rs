use actix_web::{dev::Payload, http::header, web, FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::database::db::AppError;
use crate::models::models::{TokenClaims, User};
use crate::AppState;

pub const TOKEN_COOKIE: &str = "token";

/// Authenticated caller. Resolves from the `token` cookie or a bearer header,
/// and only for users whose email address is verified.
pub struct JwtMiddleware {
    pub user_id: Uuid,
    pub user: User,
}

fn token_from_request(req: &HttpRequest) -> Option<String> {
    req.cookie(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
        })
        .filter(|t| !t.is_empty())
}

pub fn decode_user_id(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let claims = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        log::debug!("Rejected session token: {}", e);
        AppError::Unauthenticated
    })?
    .claims;

    Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthenticated)
}

/// Signs a session token for `user_id`, valid for `ttl`.
pub fn issue_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::SerializationError(e.to_string()))
}

impl FromRequest for JwtMiddleware {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let data = req.app_data::<web::Data<AppState>>().cloned();
        let token = token_from_request(req);
        let req = req.clone();

        Box::pin(async move {
            let data =
                data.ok_or_else(|| AppError::ConfigError("application state is missing".into()))?;
            let token = token.ok_or(AppError::Unauthenticated)?;
            let user_id = decode_user_id(&token, &data.env.jwt_secret)?;

            let db = data.db.clone();
            let user = web::block(move || db.get_user_by_id(user_id))
                .await??
                .ok_or(AppError::Unauthenticated)?;

            if !user.verified {
                return Err(AppError::EmailNotVerified);
            }

            req.extensions_mut().insert::<Uuid>(user_id);
            Ok(JwtMiddleware { user_id, user })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_decode_to_the_same_user() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "secret", Duration::hours(1)).unwrap();
        assert_eq!(decode_user_id(&token, "secret").unwrap(), user_id);
    }

    #[test]
    fn wrong_secret_or_expired_token_is_unauthenticated() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "secret", Duration::hours(1)).unwrap();
        assert!(matches!(
            decode_user_id(&token, "other"),
            Err(AppError::Unauthenticated)
        ));

        let expired = issue_token(user_id, "secret", Duration::hours(-2)).unwrap();
        assert!(matches!(
            decode_user_id(&expired, "secret"),
            Err(AppError::Unauthenticated)
        ));
    }
}
