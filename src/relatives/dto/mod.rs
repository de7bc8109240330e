pub mod create_relative_dto;
