use actix_web::{
  dev::ServiceRequest, error::InternalError, http::StatusCode, web, Error,
  HttpMessage,
};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use subtle::ConstantTimeEq;
use tracing::{debug, error};

use crate::{
  shared::{
    http_error::HttpError,
    identity::{Identity, IdentityError},
    repository::{FindOneProperty, Store},
    role::Role,
  },
  AppState,
};

/// Auth gate: only verified identities reach the wrapped routes.
pub async fn bearer_validator<S: Store + 'static>(
  request: ServiceRequest,
  credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
  let (data, token) = match gate::<S>(&request, credentials.as_ref()) {
    Ok(gated) => gated,
    Err(rejection) => return Err((rejection, request)),
  };

  match verify(&data, token) {
    Ok(identity) => {
      request.extensions_mut().insert(identity);
      Ok(request)
    }
    Err(rejection) => Err((rejection, request)),
  }
}

/// Admin gate: the master key, or a verified identity whose user document
/// carries the admin role.
pub async fn admin_validator<S: Store + 'static>(
  request: ServiceRequest,
  credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
  let (data, token) = match gate::<S>(&request, credentials.as_ref()) {
    Ok(gated) => gated,
    Err(rejection) => return Err((rejection, request)),
  };

  if bool::from(token.as_bytes().ct_eq(data.config.master_key.as_bytes())) {
    return Ok(request);
  }

  let identity = match verify(&data, token) {
    Ok(identity) => identity,
    Err(rejection) => return Err((rejection, request)),
  };

  match data.store.find_user(FindOneProperty::Id(&identity.uid)).await {
    Ok(Some(user)) if user.has_role(Role::Admin) => {
      request.extensions_mut().insert(identity);
      Ok(request)
    }
    Ok(_) => {
      debug!(uid = %identity.uid, "non-admin identity on admin route");
      Err((reject(StatusCode::FORBIDDEN, "Forbidden"), request))
    }
    Err(repository_error) => {
      error!(error = %repository_error, "failed to load admin user");
      Err((
        reject(
          StatusCode::INTERNAL_SERVER_ERROR,
          "An internal server error occurred.",
        ),
        request,
      ))
    }
  }
}

// The registered state and the bearer token, or the rejection to send.
fn gate<'a, S: Store + 'static>(
  request: &ServiceRequest,
  credentials: Option<&'a BearerAuth>,
) -> Result<(web::Data<AppState<S>>, &'a str), Error> {
  let Some(data) = request.app_data::<web::Data<AppState<S>>>().cloned() else {
    error!("application state is not registered");
    return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Unavailable"));
  };
  match credentials {
    Some(credentials) => Ok((data, credentials.token())),
    None => {
      debug!("request without bearer credentials");
      Err(reject(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
  }
}

fn verify<S: Store>(
  data: &web::Data<AppState<S>>,
  token: &str,
) -> Result<Identity, Error> {
  data.identity.verify(token).map_err(|identity_error| match identity_error {
    IdentityError::EmailNotVerified => {
      reject(StatusCode::FORBIDDEN, "email_not_verified")
    }
    IdentityError::Token(token_error) => {
      debug!(error = %token_error, "identity token rejected");
      reject(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
  })
}

fn reject(status: StatusCode, message: &'static str) -> Error {
  InternalError::from_response(message, HttpError::response(status, message))
    .into()
}
