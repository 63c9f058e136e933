mod test_utils;

use chrono::Duration;
use identity_lib::policy::PasswordRequirements;
use identity_lib::{LoginError, PasswordError, PunishError};
use test_utils::{scenario, User};

#[test]
fn test_set_password() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();
    s.users.set_password(credential.as_mut(), "user1$456").unwrap();

    assert!(matches!(s.users.login("U1", "user1$123"), Err(LoginError::Failed)));
    assert!(s.users.login("U1", "user1$456").is_ok());
}

#[test]
fn test_new_hashes_are_tagged_with_the_default_engine() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();
    s.users.set_password(credential.as_mut(), "user1$456").unwrap();

    let stored = s.users.by_identifier("U1").unwrap().unwrap();
    assert!(stored.hashed_password().starts_with("scrypt:"));
}

#[test]
fn test_unset_password() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();
    s.users.unset_password(credential.as_mut()).unwrap();

    assert!(matches!(s.users.login("U1", "user1$123"), Err(LoginError::Failed)));
    assert!(matches!(s.users.login("U1", ""), Err(LoginError::Failed)));
}

#[test]
fn test_change_password() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();

    assert!(matches!(
        s.users.change_password(credential.as_mut(), "user1$000", "user1$456"),
        Err(PasswordError::BadCurrentPassword)
    ));
    s.users
        .change_password(credential.as_mut(), "user1$123", "user1$456")
        .unwrap();
    assert!(s.users.login("U1", "user1$456").is_ok());
}

#[test]
fn test_reset_with_bad_token() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();

    // No reset pending.
    assert!(matches!(
        s.users.confirm_password_reset(credential.as_mut(), "ab214109sdfb", "new-password"),
        Err(PasswordError::BadToken)
    ));

    s.users
        .prepare_password_reset(credential.as_mut(), "abc123", Duration::hours(1))
        .unwrap();
    for attempt in ["abc124", "abc12", "ABC123", ""] {
        assert!(matches!(
            s.users.confirm_password_reset(credential.as_mut(), attempt, "new-password"),
            Err(PasswordError::BadToken)
        ));
    }
}

#[test]
fn test_reset_with_expired_token() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();
    s.users
        .prepare_password_reset(credential.as_mut(), "abc123", Duration::milliseconds(-1))
        .unwrap();

    assert!(matches!(
        s.users.confirm_password_reset(credential.as_mut(), "abc123", "new-password"),
        Err(PasswordError::BadToken)
    ));
}

#[test]
fn test_reset_success_consumes_the_token() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();
    s.users
        .prepare_password_reset(credential.as_mut(), "abc123", Duration::hours(1))
        .unwrap();
    s.users
        .confirm_password_reset(credential.as_mut(), "abc123", "user1$456")
        .unwrap();

    assert!(matches!(s.users.login("U1", "user1$123"), Err(LoginError::Failed)));
    assert!(s.users.login("U1", "user1$456").is_ok());
    assert!(matches!(
        s.users.confirm_password_reset(credential.as_mut(), "abc123", "user1$789"),
        Err(PasswordError::BadToken)
    ));
}

#[test]
fn test_reset_token_survives_a_reload() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();
    let token = s.users.issue_password_reset(credential.as_mut()).unwrap();
    assert!(!token.is_empty());

    let mut reloaded = s.users.by_identifier("U1").unwrap().unwrap();
    s.users
        .confirm_password_reset(reloaded.as_mut(), &token, "user1$456")
        .unwrap();
    assert!(s.users.login("U1", "user1$456").is_ok());
}

#[test]
fn test_cancelled_reset() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();
    s.users
        .prepare_password_reset(credential.as_mut(), "abc123", Duration::hours(1))
        .unwrap();
    s.users.cancel_password_reset(credential.as_mut()).unwrap();

    assert!(matches!(
        s.users.confirm_password_reset(credential.as_mut(), "abc123", "user1$456"),
        Err(PasswordError::BadToken)
    ));
}

#[test]
fn test_admins_are_not_recoverable_or_punishable() {
    let s = scenario();
    let mut admin = s.admins.login("S1", "admin-s1$123").unwrap();

    assert!(matches!(
        s.admins.prepare_password_reset(admin.as_mut(), "abc123", Duration::hours(1)),
        Err(PasswordError::NotRecoverable)
    ));
    assert!(matches!(
        s.admins.punish(admin.as_mut(), None, None, None),
        Err(PunishError::NotPunishable)
    ));
}

#[test]
fn test_punish_and_pardon() {
    let s = scenario();
    let moderator = s.admins.login("S2", "admin-s2$123").unwrap();
    let mut credential = s.users.login("U1", "user1$123").unwrap();

    s.users
        .punish(
            credential.as_mut(),
            Some(Duration::days(1)),
            Some("flooding".to_string()),
            Some(moderator.as_ref()),
        )
        .unwrap();
    match s.users.login("U1", "user1$123") {
        Err(LoginError::Punished(err)) => {
            assert_eq!(err.punished_by.map(|by| by.identifier().to_string()).as_deref(), Some("S2"));
        },
        other => panic!("expected a punishment error, got {other:?}"),
    }

    let mut credential = s.users.by_identifier("U4").unwrap().unwrap();
    s.users.pardon(credential.as_mut()).unwrap();
    assert!(s.users.login("U4", "user4$123").is_ok());
}

#[test]
fn test_failed_writes_leave_the_credential_untouched() {
    let s = scenario();
    let mut credential = s.users.login("U1", "user1$123").unwrap();
    s.users
        .prepare_password_reset(credential.as_mut(), "abc123", Duration::hours(1))
        .unwrap();
    let before = credential.hashed_password().to_string();

    s.broker.fail_writes(true);
    assert!(matches!(
        s.users.set_password(credential.as_mut(), "user1$456"),
        Err(PasswordError::Source(_))
    ));
    assert!(s.users.confirm_password_reset(credential.as_mut(), "abc123", "user1$456").is_err());
    assert!(s.users.punish(credential.as_mut(), None, None, None).is_err());

    let user = credential.downcast_ref::<User>().unwrap();
    assert_eq!(user.hashed, before);
    assert_eq!(user.recovery.peek().map(|t| t.token()), Some("abc123"));
    assert!(user.punishment.is_none());

    s.broker.fail_writes(false);
    s.users
        .confirm_password_reset(credential.as_mut(), "abc123", "user1$456")
        .unwrap();
    assert!(s.users.login("U1", "user1$456").is_ok());
}

#[test]
fn test_password_policy() {
    let s = scenario();
    let users = s.users.with_password_policy(PasswordRequirements::default());
    let mut credential = users.login("U1", "user1$123").unwrap();

    assert!(matches!(
        users.set_password(credential.as_mut(), "user1$456"),
        Err(PasswordError::TooWeak)
    ));
    users
        .prepare_password_reset(credential.as_mut(), "abc123", Duration::hours(1))
        .unwrap();
    assert!(matches!(
        users.confirm_password_reset(credential.as_mut(), "abc123", "short"),
        Err(PasswordError::TooWeak)
    ));
    // A rejected password does not consume the token.
    users
        .confirm_password_reset(credential.as_mut(), "abc123", "User1$456-long")
        .unwrap();
    assert!(users.login("U1", "User1$456-long").is_ok());
}
