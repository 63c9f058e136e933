//! Shared fixtures for the identity-lib integration tests.
//!
//! The population mirrors a small deployment: an admin realm (one superuser
//! `SU` and three staff members `S1`..`S3` with different scopes) and a user
//! realm (`U1`..`U5`) covering inactivity and the three kinds of punishment.
#![allow(dead_code)]

use chrono::{Duration, Utc};
use identity_lib::credential::{
    Activable, CredentialRef, Punishable, PunishmentRecord, Recoverable, RecoverySlot, RecoveryToken, Scoped,
    StaffCapable, SuperuserCapable,
};
use identity_lib::{
    standard_steps, Argon2Engine, Broker, BrokerError, Credential, CredentialSource, HashingEngine, Index,
    MemoryBroker, MultiHashingEngine, MultiRealm, Realm, Requirement, Scope, ScopeSet, ScryptEngine,
};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Time format used by the user realm's punishment step.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Low-cost scrypt (default) plus argon2, shared by every fixture credential.
pub static HASHER: Lazy<Arc<MultiHashingEngine>> = Lazy::new(|| {
    let scrypt: Arc<dyn HashingEngine> = Arc::new(ScryptEngine::with_params(4, 8, 1).unwrap());
    let argon2: Arc<dyn HashingEngine> = Arc::new(Argon2Engine::with_params(8, 1, 1).unwrap());
    Arc::new(MultiHashingEngine::new(vec![scrypt, argon2]).unwrap())
});

pub fn hash(password: &str) -> String {
    HASHER.hash(password).unwrap()
}

pub fn scope(n: u8) -> Scope {
    Scope::new(format!("scope{n}"), format!("Scope {n}"), format!("Sample scope {n}"))
}

#[derive(Clone, Default)]
pub struct User {
    pub id: Option<u64>,
    pub login: String,
    pub hashed: String,
    pub active: bool,
    pub punishment: Option<PunishmentRecord>,
    pub recovery: RecoverySlot,
}

impl Credential for User {
    fn identifier(&self) -> &str {
        &self.login
    }

    fn index(&self) -> Option<Index> {
        self.id.map(Index::Number)
    }

    fn hashed_password(&self) -> &str {
        &self.hashed
    }

    fn set_hashed_password(&mut self, hashed: String) {
        self.hashed = hashed;
    }

    fn hasher(&self) -> Arc<dyn HashingEngine> {
        HASHER.clone()
    }

    fn as_activable(&self) -> Option<&dyn Activable> {
        Some(self)
    }

    fn as_punishable(&self) -> Option<&dyn Punishable> {
        Some(self)
    }

    fn as_punishable_mut(&mut self) -> Option<&mut dyn Punishable> {
        Some(self)
    }

    fn as_recoverable_mut(&mut self) -> Option<&mut dyn Recoverable> {
        Some(self)
    }
}

impl Activable for User {
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Punishable for User {
    fn punishment(&self) -> Option<&PunishmentRecord> {
        self.punishment.as_ref()
    }

    fn set_punishment(&mut self, record: Option<PunishmentRecord>) {
        self.punishment = record;
    }
}

impl Recoverable for User {
    fn recovery_token(&mut self) -> Option<RecoveryToken> {
        self.recovery.get()
    }

    fn set_recovery_token(&mut self, token: Option<RecoveryToken>) {
        self.recovery.set(token);
    }
}

/// Staff member, or superuser when `superuser` is set.
#[derive(Clone, Default)]
pub struct Admin {
    pub id: Option<u64>,
    pub login: String,
    pub hashed: String,
    pub superuser: bool,
    pub scopes: ScopeSet,
}

impl Credential for Admin {
    fn identifier(&self) -> &str {
        &self.login
    }

    fn index(&self) -> Option<Index> {
        self.id.map(Index::Number)
    }

    fn hashed_password(&self) -> &str {
        &self.hashed
    }

    fn set_hashed_password(&mut self, hashed: String) {
        self.hashed = hashed;
    }

    fn hasher(&self) -> Arc<dyn HashingEngine> {
        HASHER.clone()
    }

    fn as_superuser(&self) -> Option<&dyn SuperuserCapable> {
        Some(self)
    }

    fn as_staff(&self) -> Option<&dyn StaffCapable> {
        Some(self)
    }

    fn as_scoped(&self) -> Option<&dyn Scoped> {
        Some(self)
    }
}

impl SuperuserCapable for Admin {
    fn is_superuser(&self) -> bool {
        self.superuser
    }
}

impl StaffCapable for Admin {
    fn is_staff(&self) -> bool {
        true
    }
}

impl Scoped for Admin {
    fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }
}

fn admin(id: u64, login: &str, superuser: bool, scopes: &[u8]) -> Admin {
    Admin {
        id: Some(id),
        login: login.to_string(),
        hashed: hash(&format!("admin-{}$123", login.to_lowercase())),
        superuser,
        scopes: scopes.iter().map(|n| scope(*n)).collect(),
    }
}

fn user(id: u64, active: bool, punishment: Option<PunishmentRecord>) -> User {
    User {
        id: Some(id),
        login: format!("U{id}"),
        hashed: hash(&format!("user{id}$123")),
        active,
        punishment,
        recovery: RecoverySlot::default(),
    }
}

/// Memory broker whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyBroker {
    pub inner: MemoryBroker,
    failing: AtomicBool,
}

impl FlakyBroker {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), BrokerError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(BrokerError::Backend("write refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Broker for FlakyBroker {
    fn allows(&self, template: &dyn Credential) -> bool {
        self.inner.allows(template)
    }

    fn by_identifier(
        &self,
        identifier: &str,
        template: &dyn Credential,
    ) -> Result<Option<Box<dyn Credential>>, BrokerError> {
        self.inner.by_identifier(identifier, template)
    }

    fn by_index(&self, index: &Index, template: &dyn Credential) -> Result<Option<Box<dyn Credential>>, BrokerError> {
        self.inner.by_index(index, template)
    }

    fn save(&self, credential: &dyn Credential) -> Result<(), BrokerError> {
        self.check()?;
        self.inner.save(credential)
    }

    fn delete(&self, credential: &dyn Credential) -> Result<(), BrokerError> {
        self.check()?;
        self.inner.delete(credential)
    }
}

pub struct Scenario {
    pub broker: Arc<FlakyBroker>,
    pub admins: Realm,
    pub users: Realm,
    /// Admin(scope2, scope3)
    pub admin_23: Requirement,
    /// Admin(scope5, scope7)
    pub admin_57: Requirement,
    /// Superuser, or any of scope2 and scope7
    pub try_all: Requirement,
}

/// Broker populated with the admin and user population.
pub fn populated_broker() -> Arc<FlakyBroker> {
    let broker = Arc::new(FlakyBroker::default());
    let s1 = admin(1, "S1", false, &[2, 3]);
    let punished_by = Some(CredentialRef::of(&s1));
    let week_ago = Utc::now() - Duration::days(7);

    let admins = [
        admin(10, "SU", true, &[]),
        s1,
        admin(2, "S2", false, &[5, 7]),
        admin(3, "S3", false, &[5, 3]),
    ];
    for admin in admins {
        broker.inner.insert(Box::new(admin)).unwrap();
    }

    let users = [
        user(1, true, None),
        user(2, false, None),
        user(
            3,
            true,
            Some(PunishmentRecord::new(
                week_ago,
                Some(Duration::days(3)),
                Some("Sample punishment (expired)".to_string()),
                punished_by.clone(),
            )),
        ),
        user(
            4,
            true,
            Some(PunishmentRecord::new(
                week_ago,
                Some(Duration::days(8)),
                Some("Sample punishment (active)".to_string()),
                punished_by.clone(),
            )),
        ),
        user(
            5,
            true,
            Some(PunishmentRecord::new(
                week_ago,
                None,
                Some("Sample punishment (eternal)".to_string()),
                punished_by,
            )),
        ),
    ];
    for user in users {
        broker.inner.insert(Box::new(user)).unwrap();
    }
    broker
}

pub fn admin_realm(broker: &Arc<FlakyBroker>) -> Realm {
    let broker: Arc<dyn Broker> = broker.clone();
    // Admins are not punishable; the punishment step would always pass.
    let steps = standard_steps().into_iter().take(2).collect();
    Realm::new(CredentialSource::of::<Admin>(broker).unwrap(), steps)
}

pub fn user_realm(broker: &Arc<FlakyBroker>) -> Realm {
    let broker: Arc<dyn Broker> = broker.clone();
    Realm::new(
        CredentialSource::of::<User>(broker).unwrap(),
        identity_lib::realm::standard_steps_with_format(TIME_FORMAT),
    )
}

pub fn scenario() -> Scenario {
    let broker = populated_broker();
    Scenario {
        admins: admin_realm(&broker),
        users: user_realm(&broker),
        broker,
        admin_23: Requirement::admin([scope(2), scope(3)]),
        admin_57: Requirement::admin([scope(5), scope(7)]),
        try_all: Requirement::any([
            Requirement::Superuser,
            Requirement::any([scope(2), scope(7)]),
        ]),
    }
}

pub fn multi_realm() -> (Arc<FlakyBroker>, MultiRealm) {
    let broker = populated_broker();
    let multi = MultiRealm::new([("admins", admin_realm(&broker)), ("users", user_realm(&broker))]).unwrap();
    (broker, multi)
}
