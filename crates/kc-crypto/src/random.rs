//! Cryptographically secure random generation.
//!
//! Used for pairwise mapper salts. All functions draw from the
//! thread-local generator, which is a CSPRNG seeded from the OS.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use rand::Rng;

/// Minimum salt length in bytes accepted by [`generate_salt`].
pub const MIN_SALT_BYTES: usize = 16;

/// Default salt length in bytes.
pub const DEFAULT_SALT_BYTES: usize = 24;

/// Generates `len` cryptographically secure random bytes.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Generates `byte_len` random bytes encoded as unpadded standard base64.
#[must_use]
pub fn random_base64(byte_len: usize) -> String {
    STANDARD_NO_PAD.encode(random_bytes(byte_len))
}

/// Generates a fresh pairwise salt.
///
/// The salt is stored in mapper configuration as text, so it is
/// base64-encoded. Requests below [`MIN_SALT_BYTES`] are raised to it.
#[must_use]
pub fn generate_salt(byte_len: usize) -> String {
    random_base64(byte_len.max(MIN_SALT_BYTES))
}
