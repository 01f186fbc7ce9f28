//! Request and response bodies

pub mod auth;
pub mod quote;
pub mod payment;
