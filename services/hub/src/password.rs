//! One-way adaptive password hashing with argon2id

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasherConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordHasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHasherConfig {
    /// Create a new PasswordHasherConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ARGON2_MEMORY_KIB`: Memory cost in KiB (default: 19456)
    /// - `ARGON2_ITERATIONS`: Number of passes (default: 2)
    /// - `ARGON2_PARALLELISM`: Lanes (default: 1)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let read = |name: &str, default: u32| -> Result<u32> {
            match std::env::var(name) {
                Ok(raw) => raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{} must be an integer: {}", name, e)),
                Err(_) => Ok(default),
            }
        };

        let config = Self {
            memory_kib: read("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: read("ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: read("ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        // Reject impossible cost settings at startup rather than on first login.
        PasswordHasher::new(config)?;
        Ok(config)
    }
}

/// Hashes and verifies passwords; plaintext never leaves this type
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(config: PasswordHasherConfig) -> Result<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid argon2 parameters: {}", e))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password into a PHC string
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(hash)
    }

    /// Check a password against a stored PHC string
    ///
    /// An unparseable stored hash counts as a mismatch.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
