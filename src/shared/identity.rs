use std::future::{ready, Ready};

use actix_web::{
  dev::Payload, error::InternalError, http::StatusCode, FromRequest,
  HttpMessage, HttpRequest,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
  config::{Config, IdentityKey},
  http_error::HttpError,
};

#[derive(Debug, Error)]
pub enum IdentityError {
  #[error("Invalid identity token: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),

  #[error("Email not verified")]
  EmailNotVerified,
}

/// Claims of the identities issued by the authentication provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
  pub sub: String,
  pub email: String,
  #[serde(default)]
  pub email_verified: bool,
  pub iat: u64,
  pub exp: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub iss: Option<String>,
  /// A single audience or an array of them.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub aud: Option<serde_json::Value>,
}

/// A verified caller. Inserted into the request extensions by the bearer
/// validators and extracted by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub uid: String,
  pub email: String,
}

pub struct IdentityVerifier {
  key: DecodingKey,
  validation: Validation,
}

impl IdentityVerifier {
  pub fn new(config: &Config) -> Result<Self, IdentityError> {
    let (key, algorithm) = match &config.identity_key {
      IdentityKey::Secret(secret) => {
        (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
      }
      IdentityKey::RsaPem(pem) => {
        (DecodingKey::from_rsa_pem(pem)?, Algorithm::RS256)
      }
    };

    let mut validation = Validation::new(algorithm);
    let mut required = vec!["exp", "sub"];
    if let Some(issuer) = &config.identity_issuer {
      validation.set_issuer(&[issuer]);
      required.push("iss");
    }
    match &config.identity_audience {
      Some(audience) => {
        validation.set_audience(&[audience]);
        required.push("aud");
      }
      None => validation.validate_aud = false,
    }
    validation.set_required_spec_claims(&required);

    Ok(Self { key, validation })
  }

  pub fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
    let claims =
      decode::<IdentityClaims>(token, &self.key, &self.validation)?.claims;
    if !claims.email_verified {
      return Err(IdentityError::EmailNotVerified);
    }
    Ok(Identity {
      uid: claims.sub,
      email: claims.email,
    })
  }
}

impl FromRequest for Identity {
  type Error = actix_web::Error;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(request: &HttpRequest, _: &mut Payload) -> Self::Future {
    ready(request.extensions().get::<Identity>().cloned().ok_or_else(|| {
      InternalError::from_response(
        "missing identity",
        HttpError::response(StatusCode::UNAUTHORIZED, "Unauthorized"),
      )
      .into()
    }))
  }
}
