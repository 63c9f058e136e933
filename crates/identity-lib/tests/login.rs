mod test_utils;

use chrono::Utc;
use identity_lib::LoginError;
use test_utils::scenario;

#[test]
fn test_active_user_logs_in() {
    let s = scenario();
    let credential = s.users.login("U1", "user1$123").unwrap();
    assert_eq!(credential.identifier(), "U1");

    assert!(matches!(s.users.login("U1", "wrong"), Err(LoginError::Failed)));
}

#[test]
fn test_inactive_user_fails_with_any_password() {
    let s = scenario();
    assert!(matches!(s.users.login("U2", "user2$123"), Err(LoginError::Failed)));
    assert!(matches!(s.users.login("U2", "wrong"), Err(LoginError::Failed)));
}

#[test]
fn test_expired_punishment_does_not_block() {
    let s = scenario();
    let credential = s.users.login("U3", "user3$123").unwrap();
    // The elapsed record stays on the credential.
    let user = credential.downcast_ref::<test_utils::User>().unwrap();
    assert!(user.punishment.is_some());
}

#[test]
fn test_current_punishment_blocks() {
    let s = scenario();
    match s.users.login("U4", "user4$123") {
        Err(LoginError::Punished(err)) => {
            assert!(err.punished_for.is_some());
            assert!(!err.is_permanent());
            assert!(err.ends_at().is_some_and(|end| end > Utc::now()));
            assert_eq!(err.reason.as_deref(), Some("Sample punishment (active)"));
            assert_eq!(err.punished_by.as_ref().map(|by| by.identifier()), Some("S1"));
            assert_eq!(err.time_format, test_utils::TIME_FORMAT);
            assert!(err.to_string().contains("by: S1"));
        },
        other => panic!("expected a punishment error, got {other:?}"),
    }
}

#[test]
fn test_permanent_punishment_blocks() {
    let s = scenario();
    match s.users.login("U5", "user5$123") {
        Err(LoginError::Punished(err)) => {
            assert!(err.punished_for.is_none());
            assert!(err.ends_at().is_none());
            assert!(err.to_string().contains("permanently"));
        },
        other => panic!("expected a punishment error, got {other:?}"),
    }
}

#[test]
fn test_punishment_is_checked_after_the_password() {
    let s = scenario();
    assert!(matches!(s.users.login("U4", "wrong"), Err(LoginError::Failed)));
}

#[test]
fn test_unknown_identifier_looks_like_a_bad_password() {
    let s = scenario();
    let unknown = s.users.login("U9", "user9$123").unwrap_err();
    let wrong = s.users.login("U1", "nope").unwrap_err();

    assert!(matches!(unknown, LoginError::Failed));
    assert_eq!(unknown.error_code(), wrong.error_code());
    assert_eq!(unknown.sanitized_message(), wrong.sanitized_message());
}

#[test]
fn test_realms_only_see_their_own_credential_type() {
    let s = scenario();
    assert!(s.admins.login("SU", "admin-su$123").is_ok());
    assert!(matches!(s.users.login("SU", "admin-su$123"), Err(LoginError::Failed)));
    assert!(matches!(s.admins.login("U1", "user1$123"), Err(LoginError::Failed)));
}
