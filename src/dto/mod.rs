pub mod admin;
pub mod auth;
pub mod banners;
pub mod categories;
pub mod common;
pub mod orders;
pub mod products;
pub mod users;
