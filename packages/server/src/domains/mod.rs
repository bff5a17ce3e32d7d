// Business domains
pub mod auth;
pub mod contacts;
pub mod member;
