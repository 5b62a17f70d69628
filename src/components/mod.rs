pub mod config_form;
pub mod navbar;
pub mod notification;
pub mod require_auth;
pub mod status_badge;
