use super::{HashError, PasswordHasher};

/// bcrypt-backed [`PasswordHasher`].
///
/// The cost factor is the base-2 logarithm of the number of key expansion
/// rounds, so each increment doubles the time spent per hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Cost used when none is configured.
    pub const DEFAULT_COST: u32 = 14;
    /// Smallest cost bcrypt accepts.
    pub const MIN_COST: u32 = 4;
    /// Largest cost bcrypt accepts.
    pub const MAX_COST: u32 = 31;

    /// Creates a hasher with the given cost.
    ///
    /// Costs outside [`Self::MIN_COST`]..=[`Self::MAX_COST`] are accepted here
    /// and surface as a [`HashError`] on every hash.
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, payload: &str) -> Result<String, HashError> {
        Ok(::bcrypt::hash(payload, self.cost)?)
    }

    fn verify(&self, payload: &str, hash: &str) -> Result<bool, HashError> {
        Ok(::bcrypt::verify(payload, hash)?)
    }
}

impl From<::bcrypt::BcryptError> for HashError {
    fn from(err: ::bcrypt::BcryptError) -> Self {
        Self::new(err.to_string())
    }
}
