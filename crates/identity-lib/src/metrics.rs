// ==============
// crates/identity-lib/src/metrics.rs

//! Central place for metric keys
pub const LOGIN_SUCCEEDED: &str = "login.succeeded";
pub const LOGIN_REJECTED: &str = "login.rejected";
pub const LOGIN_UNKNOWN: &str = "login.unknown";
pub const PASSWORD_CHANGED: &str = "password.changed";
pub const PASSWORD_RESET_PREPARED: &str = "password.reset_prepared";
pub const PASSWORD_RESET_CONFIRMED: &str = "password.reset_confirmed";
pub const CREDENTIAL_PUNISHED: &str = "credential.punished";
