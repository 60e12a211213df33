use actix_web::dev::ServiceRequest;
use actix_web::{web, Error, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{decode, DecodingKey, Validation};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Claims issued by the identity provider. `sub` is the opaque owner id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Shared secret used to verify bearer tokens.
#[derive(Clone)]
pub struct JwtSecret(pub String);

/// Stands in for the identity provider in tests.
#[cfg(test)]
pub fn generate_token(secret: &str, owner: &str, ttl: chrono::Duration) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims {
        sub: owner.to_string(),
        exp,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates a JWT token and returns the claims if valid.
pub fn validate_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Validator for the `HttpAuthentication::bearer` middleware. On success the
/// claims are stored in the request extensions for [`owner_id`].
pub async fn validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let secret = match req.app_data::<web::Data<JwtSecret>>() {
        Some(secret) => secret.0.clone(),
        None => {
            return Err((
                AppError::InternalServerError("Authentication is not configured".to_string()).into(),
                req,
            ))
        }
    };

    match validate_token(&secret, credentials.token()) {
        Ok(claims) if !claims.sub.is_empty() => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Ok(_) | Err(_) => {
            warn!("Rejected bearer token for {}", req.path());
            Err((AppError::Unauthorized("Invalid token".to_string()).into(), req))
        }
    }
}

/// Owner id of the authenticated caller.
pub fn owner_id(req: &HttpRequest) -> Result<String, AppError> {
    req.extensions()
        .get::<Claims>()
        .map(|claims| claims.sub.clone())
        .ok_or_else(|| AppError::Unauthorized("Missing owner context".to_string()))
}
