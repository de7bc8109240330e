use utoipa::{
  openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
  Modify, OpenApi,
};

use crate::{families, permissions, places, registry, relatives, shared, users};

#[derive(OpenApi)]
#[openapi(
  info(
    title = "anagrafe",
    description = "Membership registry of the organization: profiles, \
                   families, relatives and the admin registry."
  ),
  paths(
    shared::handlers::check_health,
    users::register_profile,
    users::get_profile,
    users::update_profile,
    users::list_users,
    users::get_user,
    users::set_roles,
    families::get_family,
    families::add_member,
    families::update_member,
    families::delete_member,
    relatives::create_relative,
    relatives::list_relatives,
    relatives::delete_relative,
    registry::get_registry,
    permissions::get_permissions,
    permissions::save_permissions,
    places::lookup_places,
  ),
  modifiers(&BearerSecurity),
  tags(
    (name = "users", description = "The caller's own profile"),
    (name = "family", description = "The household the caller heads"),
    (name = "relatives", description = "Relatives registered by the caller"),
    (name = "admin", description = "Admin role or master key only"),
    (name = "places", description = "Address autocomplete"),
    (name = "health", description = "Service health")
  )
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
  fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
    let components = openapi.components.get_or_insert_with(Default::default);
    components.add_security_scheme(
      "bearer",
      SecurityScheme::Http(
        HttpBuilder::new()
          .scheme(HttpAuthScheme::Bearer)
          .bearer_format("JWT")
          .description(Some(
            "Identity token of the authentication provider, or the master \
             key on admin routes",
          ))
          .build(),
      ),
    );
  }
}
