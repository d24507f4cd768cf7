//! Argon2-based implementation of `AuthProvider`.
//! Handles password hashing, bearer token minting and client-address pseudonyms.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use base64::Engine;
use domains::ports::AuthProvider;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Raw bytes of entropy per bearer token.
const TOKEN_BYTES: usize = 32;

pub struct Argon2AuthProvider {
    argon2: Argon2<'static>,
    /// Key for client-address hashing (from configuration, stable across restarts
    /// so the same sender keeps the same pseudonym).
    ip_secret: SecretString,
}

impl Argon2AuthProvider {
    pub fn new(ip_secret: SecretString) -> Self {
        Self { argon2: Argon2::default(), ip_secret }
    }
}

impl AuthProvider for Argon2AuthProvider {
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies a password against a stored PHC string. Unparseable hashes never match.
    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn generate_token(&self) -> String {
        let mut buf = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut buf);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
    }

    fn hash_ip(&self, ip: &str) -> String {
        let digest = match HmacSha256::new_from_slice(self.ip_secret.expose_secret().as_bytes()) {
            Ok(mut mac) => {
                mac.update(ip.as_bytes());
                mac.finalize().into_bytes().to_vec()
            }
            // HMAC takes keys of any length; kept for type completeness.
            Err(_) => Sha256::digest(ip.as_bytes()).to_vec(),
        };
        hex::encode(&digest[..16])
    }
}
