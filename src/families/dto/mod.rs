pub mod member_dto;
