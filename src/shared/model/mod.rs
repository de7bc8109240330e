pub mod address;
pub mod family;
pub mod permission;
pub mod person;
pub mod relative;
pub mod user;
