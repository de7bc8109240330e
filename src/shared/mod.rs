pub mod config;
pub mod database;
pub mod handlers;
pub mod health_check;
pub mod http_error;
pub mod identity;
pub mod middleware;
pub mod model;
pub mod repository;
pub mod role;
pub mod rto;
pub mod slug;
