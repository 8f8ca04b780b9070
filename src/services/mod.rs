pub mod auth;
pub mod authz;
pub mod business;
pub mod mailer;
pub mod maintenance;
