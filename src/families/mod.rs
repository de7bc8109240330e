pub mod dto;
pub mod rto;

use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use dto::member_dto::MemberDto;
use nanoid::nanoid;
use rto::family_rto::FamilyRto;
use tracing::info;
use validator::Validate;

use crate::shared::{
  http_error::{not_found, repository_failure, HttpError},
  identity::Identity,
  model::family::{Family, Member},
  repository::{RepositoryError, Store},
  rto::created_rto::CreatedRto,
};
use crate::AppState;

const FAMILY_NOT_FOUND: &str = "Family not found";
const MEMBER_NOT_FOUND: &str = "Member not found";

#[utoipa::path(
  get,
  path = "/v1/family",
  tag = "family",
  responses(
    (
      status = 200,
      description = "The family the caller heads",
      body = FamilyRto
    ),
    (status = 404, description = "The caller heads no family", body = HttpError)
  ),
  security(("bearer" = []))
)]
pub async fn get_family<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
) -> impl Responder {
  let family = match headed_family(&data.store, &identity).await {
    Ok(Some(family)) => family,
    Ok(None) => return not_found(FAMILY_NOT_FOUND),
    Err(error) => return repository_failure(error),
  };

  let mut members = match data.store.find_members(&family.id).await {
    Ok(members) => members,
    Err(error) => return repository_failure(error),
  };
  members.sort_by(|a, b| a.created_at.cmp(&b.created_at));

  HttpResponse::Ok().json(FamilyRto {
    residence: family.address.residence_or_unspecified(),
    family,
    members,
  })
}

#[utoipa::path(
  post,
  path = "/v1/family/members",
  tag = "family",
  request_body = MemberDto,
  responses(
    (status = 201, description = "Member added", body = CreatedRto),
    (status = 400, description = "Validation failed"),
    (status = 404, description = "The caller heads no family", body = HttpError)
  ),
  security(("bearer" = []))
)]
pub async fn add_member<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
  dto: web::Json<MemberDto>,
) -> impl Responder {
  if let Err(validation_errors) = dto.validate() {
    return HttpResponse::BadRequest().json(validation_errors);
  }

  let family = match headed_family(&data.store, &identity).await {
    Ok(Some(family)) => family,
    Ok(None) => return not_found(FAMILY_NOT_FOUND),
    Err(error) => return repository_failure(error),
  };

  let member = Member {
    id: nanoid!(),
    family_id: family.id,
    person: dto.into_inner().person.normalized(),
    created_at: Utc::now(),
  };

  match data.store.create_member(&member).await {
    Ok(()) => {
      info!(family = %member.family_id, member = %member.id, "member added");
      HttpResponse::Created()
        .content_type("application/json")
        .append_header((
          header::LOCATION,
          format!("/v1/family/members/{}", member.id),
        ))
        .json(CreatedRto { id: member.id })
    }
    Err(RepositoryError::NotFound) => not_found(FAMILY_NOT_FOUND),
    Err(error) => repository_failure(error),
  }
}

#[utoipa::path(
  put,
  path = "/v1/family/members/{id}",
  tag = "family",
  params(("id" = String, Path, description = "Member id")),
  request_body = MemberDto,
  responses(
    (status = 200, description = "Member replaced", body = Member),
    (status = 400, description = "Validation failed"),
    (
      status = 404,
      description = "No such member in the caller's family",
      body = HttpError
    )
  ),
  security(("bearer" = []))
)]
pub async fn update_member<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
  path: web::Path<String>,
  dto: web::Json<MemberDto>,
) -> impl Responder {
  if let Err(validation_errors) = dto.validate() {
    return HttpResponse::BadRequest().json(validation_errors);
  }

  let family = match headed_family(&data.store, &identity).await {
    Ok(Some(family)) => family,
    Ok(None) => return not_found(FAMILY_NOT_FOUND),
    Err(error) => return repository_failure(error),
  };
  let members = match data.store.find_members(&family.id).await {
    Ok(members) => members,
    Err(error) => return repository_failure(error),
  };
  let Some(mut member) = members.into_iter().find(|m| m.id == *path) else {
    return not_found(MEMBER_NOT_FOUND);
  };

  member.person = dto.into_inner().person.normalized();
  match data.store.update_member(&member).await {
    Ok(()) => HttpResponse::Ok().json(member),
    Err(RepositoryError::NotFound) => not_found(MEMBER_NOT_FOUND),
    Err(error) => repository_failure(error),
  }
}

#[utoipa::path(
  delete,
  path = "/v1/family/members/{id}",
  tag = "family",
  params(("id" = String, Path, description = "Member id")),
  responses(
    (status = 204, description = "Member removed"),
    (
      status = 404,
      description = "No such member in the caller's family",
      body = HttpError
    )
  ),
  security(("bearer" = []))
)]
pub async fn delete_member<S: Store>(
  data: web::Data<AppState<S>>,
  identity: Identity,
  path: web::Path<String>,
) -> impl Responder {
  let family = match headed_family(&data.store, &identity).await {
    Ok(Some(family)) => family,
    Ok(None) => return not_found(FAMILY_NOT_FOUND),
    Err(error) => return repository_failure(error),
  };

  match data.store.delete_member(&family.id, &path).await {
    Ok(()) => {
      info!(family = %family.id, member = %path, "member removed");
      HttpResponse::NoContent().finish()
    }
    Err(RepositoryError::NotFound) => not_found(MEMBER_NOT_FOUND),
    Err(error) => repository_failure(error),
  }
}

async fn headed_family<S: Store>(
  store: &S,
  identity: &Identity,
) -> Result<Option<Family>, RepositoryError> {
  store.find_family_by_head(&identity.uid).await
}

#[cfg(test)]
mod tests {
  use actix_web::{http::StatusCode, test, App};
  use chrono::Duration;
  use serde_json::json;

  use super::*;
  use crate::{
    app_config,
    helpers::tests::{bearer, seed_user, test_state},
    shared::{
      database::InMemoryDatabase,
      identity::tests::identity_token,
      model::{
        address::tests::milan_address, family::HouseholdChange, person::Person,
        user::User,
      },
      repository::FamilyRepository,
      role::Role,
    },
  };

  async fn seed_household(store: &InMemoryDatabase) -> (User, Family) {
    let mut user = seed_user(store, vec![Role::Parent]).await;
    user.profile.address = milan_address();
    let change =
      HouseholdChange::plan(None, &user.id, &user.profile.address, Utc::now());
    store.commit_household(&user, &change).await.unwrap();
    let family = store.find_family_by_head(&user.id).await.unwrap().unwrap();
    (user, family)
  }

  fn member_body(first_name: &str) -> serde_json::Value {
    json!({
      "nome": first_name,
      "cognome": "Rossi",
      "dataNascita": "2015-09-01",
      "codiceFiscale": "rssgli15p01f205z"
    })
  }

  #[actix_web::test]
  async fn test_get_family_lists_members_oldest_first() {
    let store = InMemoryDatabase::new();
    let (user, family) = seed_household(&store).await;
    let now = Utc::now();
    for (id, age) in [("young", 1), ("old", 5)] {
      store
        .create_member(&Member {
          id: id.to_string(),
          family_id: family.id.clone(),
          person: Person {
            first_name: id.to_string(),
            last_name: "Rossi".to_string(),
            birth_date: "2010-01-01".to_string(),
            ..Default::default()
          },
          created_at: now - Duration::minutes(age),
        })
        .await
        .unwrap();
    }
    let app = test::init_service(
      App::new().configure(app_config(test_state(store.clone()))),
    )
    .await;

    let request = test::TestRequest::get()
      .uri("/v1/family")
      .insert_header(bearer(&identity_token(&user.id, &user.email, true)))
      .to_request();
    let rto: FamilyRto = test::call_and_read_body_json(&app, request).await;
    assert_eq!(rto.family.id, family.id);
    assert_eq!(rto.residence, "Via Roma 12, Milano (MI) 20121");
    let ids: Vec<&str> = rto.members.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["old", "young"]);
  }

  #[actix_web::test]
  async fn test_caller_without_family_gets_not_found() {
    let store = InMemoryDatabase::new();
    let user = seed_user(&store, vec![Role::Member]).await;
    let app = test::init_service(
      App::new().configure(app_config(test_state(store.clone()))),
    )
    .await;
    let token = identity_token(&user.id, &user.email, true);

    let request = test::TestRequest::get()
      .uri("/v1/family")
      .insert_header(bearer(&token))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = test::TestRequest::post()
      .uri("/v1/family/members")
      .insert_header(bearer(&token))
      .set_json(member_body("Giulia"))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }

  #[actix_web::test]
  async fn test_member_lifecycle() {
    let store = InMemoryDatabase::new();
    let (user, family) = seed_household(&store).await;
    let app = test::init_service(
      App::new().configure(app_config(test_state(store.clone()))),
    )
    .await;
    let token = identity_token(&user.id, &user.email, true);

    let request = test::TestRequest::post()
      .uri("/v1/family/members")
      .insert_header(bearer(&token))
      .set_json(member_body("Giulia"))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: CreatedRto = test::read_body_json(response).await;

    let stored = store.find_members(&family.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].person.tax_code.as_deref(), Some("RSSGLI15P01F205Z"));
    let created_at = stored[0].created_at;

    let request = test::TestRequest::put()
      .uri(&format!("/v1/family/members/{}", created.id))
      .insert_header(bearer(&token))
      .set_json(member_body("Giulietta"))
      .to_request();
    let updated: Member = test::call_and_read_body_json(&app, request).await;
    assert_eq!(updated.person.first_name, "Giulietta");
    assert_eq!(updated.created_at, created_at);

    let request = test::TestRequest::delete()
      .uri(&format!("/v1/family/members/{}", created.id))
      .insert_header(bearer(&token))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = test::TestRequest::delete()
      .uri(&format!("/v1/family/members/{}", created.id))
      .insert_header(bearer(&token))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }

  #[actix_web::test]
  async fn test_member_requires_birth_date() {
    let store = InMemoryDatabase::new();
    let (user, _) = seed_household(&store).await;
    let app = test::init_service(
      App::new().configure(app_config(test_state(store.clone()))),
    )
    .await;

    let request = test::TestRequest::post()
      .uri("/v1/family/members")
      .insert_header(bearer(&identity_token(&user.id, &user.email, true)))
      .set_json(json!({
        "nome": "Giulia",
        "cognome": "Rossi",
        "dataNascita": ""
      }))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn test_members_of_other_families_are_out_of_reach() {
    let store = InMemoryDatabase::new();
    let (_, family) = seed_household(&store).await;
    store
      .create_member(&Member {
        id: "theirs".to_string(),
        family_id: family.id.clone(),
        person: Person::default(),
        created_at: Utc::now(),
      })
      .await
      .unwrap();
    let stranger = seed_user(&store, vec![Role::Member]).await;
    let app = test::init_service(
      App::new().configure(app_config(test_state(store.clone()))),
    )
    .await;

    let request = test::TestRequest::delete()
      .uri("/v1/family/members/theirs")
      .insert_header(bearer(&identity_token(
        &stranger.id,
        &stranger.email,
        true,
      )))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.find_members(&family.id).await.unwrap().len(), 1);
  }
}
