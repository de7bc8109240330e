pub mod register_profile_dto;
pub mod set_roles_dto;
pub mod update_profile_dto;
