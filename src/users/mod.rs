pub mod dto;
pub mod rto;

use std::collections::HashMap;

use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use dto::{
  register_profile_dto::RegisterProfileDto, set_roles_dto::SetRolesDto,
  update_profile_dto::UpdateProfileDto,
};
use rto::find_user_rto::FindUserRto;
use tracing::info;
use validator::Validate;

use crate::shared::{
  http_error::{not_found, repository_failure, HttpError},
  identity::Identity,
  model::{
    family::HouseholdChange,
    user::{Profile, User},
  },
  repository::{FindOneProperty, Store},
  role::{normalize_roles, Role},
};
use crate::AppState;

#[utoipa::path(
  post,
  path = "/v1/me",
  tag = "users",
  request_body = RegisterProfileDto,
  responses(
    (status = 201, description = "Profile registered", body = FindUserRto),
    (
      status = 200,
      description = "Profile already registered",
      body = FindUserRto
    ),
    (status = 400, description = "Validation failed")
  ),
  security(("bearer" = []))
)]
pub async fn register_profile<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
  dto: web::Json<RegisterProfileDto>,
) -> impl Responder {
  if let Err(validation_errors) = dto.validate() {
    return HttpResponse::BadRequest().json(validation_errors);
  }

  match data.store.find_user(FindOneProperty::Id(&identity.uid)).await {
    Ok(Some(user)) => return user_response(&data, user).await,
    Ok(None) => {}
    Err(error) => return repository_failure(error),
  }

  let user = User::register(identity, dto.into_inner(), Utc::now());
  match data.store.create_user(&user).await {
    Ok(()) => {
      info!(uid = %user.id, "profile registered");
      HttpResponse::Created()
        .content_type("application/json")
        .append_header((header::LOCATION, "/v1/me"))
        .json(FindUserRto {
          user,
          family_id: None,
        })
    }
    Err(error) => repository_failure(error),
  }
}

#[utoipa::path(
  get,
  path = "/v1/me",
  tag = "users",
  responses(
    (status = 200, description = "Caller's profile", body = FindUserRto),
    (status = 404, description = "Profile not registered", body = HttpError)
  ),
  security(("bearer" = []))
)]
pub async fn get_profile<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
) -> impl Responder {
  match data.store.find_user(FindOneProperty::Id(&identity.uid)).await {
    Ok(Some(user)) => user_response(&data, user).await,
    Ok(None) => profile_not_registered(),
    Err(error) => repository_failure(error),
  }
}

/// Saves the profile; a usable address also moves or creates the caller's
/// family in the same atomic write.
#[utoipa::path(
  put,
  path = "/v1/me",
  tag = "users",
  request_body = UpdateProfileDto,
  responses(
    (status = 200, description = "Profile saved", body = FindUserRto),
    (status = 400, description = "Validation failed"),
    (status = 404, description = "Profile not registered", body = HttpError),
    (
      status = 409,
      description = "Address taken by another household, or the household \
                     changed during the update",
      body = HttpError
    )
  ),
  security(("bearer" = []))
)]
pub async fn update_profile<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
  dto: web::Json<UpdateProfileDto>,
) -> impl Responder {
  if let Err(validation_errors) = dto.validate() {
    return HttpResponse::BadRequest().json(validation_errors);
  }

  let mut user =
    match data.store.find_user(FindOneProperty::Id(&identity.uid)).await {
      Ok(Some(user)) => user,
      Ok(None) => return profile_not_registered(),
      Err(error) => return repository_failure(error),
    };
  let existing = match data.store.find_family_by_head(&user.id).await {
    Ok(family) => family,
    Err(error) => return repository_failure(error),
  };

  let now = Utc::now();
  user.email = identity.email;
  user.profile = Profile::from(dto.into_inner());
  user.display_name = user.profile.display_name();
  user.updated_at = now;

  let change = HouseholdChange::plan(
    existing.as_ref(),
    &user.id,
    &user.profile.address,
    now,
  );
  if let Err(error) = data.store.commit_household(&user, &change).await {
    return repository_failure(error);
  }

  let family_id = change
    .target()
    .map(|family| family.id.clone())
    .or(existing.map(|family| family.id));
  if let HouseholdChange::Move { from, to } = &change {
    info!(uid = %user.id, from = %from, to = %to.id, "household moved");
  }

  HttpResponse::Ok().json(FindUserRto { user, family_id })
}

#[utoipa::path(
  get,
  path = "/v1/admin/users",
  tag = "admin",
  responses(
    (
      status = 200,
      description = "Every user, by surname",
      body = [FindUserRto]
    ),
    (status = 403, description = "Not an admin", body = HttpError)
  ),
  security(("bearer" = []))
)]
pub async fn list_users<S: Store>(
  data: web::Data<AppState<S>>,
) -> impl Responder {
  let users = match data.store.find_all_users().await {
    Ok(users) => users,
    Err(error) => return repository_failure(error),
  };
  let families = match data.store.find_all_families().await {
    Ok(families) => families,
    Err(error) => return repository_failure(error),
  };

  let family_by_head: HashMap<String, String> = families
    .into_iter()
    .map(|family| (family.head_user_id, family.id))
    .collect();

  let mut rtos: Vec<FindUserRto> = users
    .into_iter()
    .map(|user| FindUserRto {
      family_id: family_by_head.get(&user.id).cloned(),
      user,
    })
    .collect();
  rtos.sort_by_cached_key(|rto| {
    (
      rto.user.profile.last_name.to_lowercase(),
      rto.user.profile.first_name.to_lowercase(),
      rto.user.email.to_lowercase(),
    )
  });

  HttpResponse::Ok().json(rtos)
}

#[utoipa::path(
  get,
  path = "/v1/admin/users/{id}",
  tag = "admin",
  params(("id" = String, Path, description = "User id")),
  responses(
    (status = 200, description = "The user", body = FindUserRto),
    (status = 404, description = "No such user", body = HttpError)
  ),
  security(("bearer" = []))
)]
pub async fn get_user<S: Store>(
  data: web::Data<AppState<S>>,
  path: web::Path<String>,
) -> impl Responder {
  match data.store.find_user(FindOneProperty::Id(&path)).await {
    Ok(Some(user)) => user_response(&data, user).await,
    Ok(None) => user_not_found(),
    Err(error) => repository_failure(error),
  }
}

#[utoipa::path(
  put,
  path = "/v1/admin/users/{id}/roles",
  tag = "admin",
  params(("id" = String, Path, description = "User id")),
  request_body = SetRolesDto,
  responses(
    (status = 200, description = "Roles replaced", body = FindUserRto),
    (status = 400, description = "Empty role set"),
    (status = 404, description = "No such user", body = HttpError)
  ),
  security(("bearer" = []))
)]
pub async fn set_roles<S: Store>(
  data: web::Data<AppState<S>>,
  path: web::Path<String>,
  dto: web::Json<SetRolesDto>,
) -> impl Responder {
  if let Err(validation_errors) = dto.validate() {
    return HttpResponse::BadRequest().json(validation_errors);
  }

  let mut user = match data.store.find_user(FindOneProperty::Id(&path)).await
  {
    Ok(Some(user)) => user,
    Ok(None) => return user_not_found(),
    Err(error) => return repository_failure(error),
  };

  user.roles = normalize_roles(dto.into_inner().roles);
  user.updated_at = Utc::now();
  if let Err(error) = data.store.update_user(&user).await {
    return repository_failure(error);
  }

  info!(uid = %user.id, roles = ?user.roles, "roles updated");
  user_response(&data, user).await
}

async fn user_response<S: Store>(
  data: &web::Data<AppState<S>>,
  user: User,
) -> HttpResponse {
  match data.store.find_family_by_head(&user.id).await {
    Ok(family) => HttpResponse::Ok().json(FindUserRto {
      user,
      family_id: family.map(|family| family.id),
    }),
    Err(error) => repository_failure(error),
  }
}

fn profile_not_registered() -> HttpResponse {
  not_found("Profile not registered")
}

fn user_not_found() -> HttpResponse {
  not_found("User not found")
}

impl User {
  fn register(
    identity: Identity,
    dto: RegisterProfileDto,
    now: DateTime<Utc>,
  ) -> Self {
    let profile = Profile {
      first_name: dto.first_name.trim().to_string(),
      last_name: dto.last_name.trim().to_string(),
      ..Default::default()
    };
    Self {
      id: identity.uid,
      email: identity.email,
      email_verified: true,
      display_name: profile.display_name(),
      roles: vec![Role::Member],
      profile,
      created_at: now,
      updated_at: now,
    }
  }
}
