//! Request handlers

pub mod health;
pub mod auth;
pub mod products;
pub mod premium;
pub mod quotes;
pub mod payments;
