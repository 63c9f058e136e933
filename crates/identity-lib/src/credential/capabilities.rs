use identity_common::ScopeSet;

/// Inactive credentials fail to log in as if they did not exist.
pub trait Activable {
    fn is_active(&self) -> bool;
}

/// Superusers satisfy every admin requirement regardless of scopes.
pub trait SuperuserCapable {
    fn is_superuser(&self) -> bool;
}

/// Staff status is necessary, but not sufficient, for admin requirements.
pub trait StaffCapable {
    fn is_staff(&self) -> bool;
}

pub trait Scoped {
    fn scopes(&self) -> &ScopeSet;
}
