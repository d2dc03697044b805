//! Keyed hashing and digest-to-identifier mapping.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use uuid::{Builder, Uuid};

use crate::algorithm::{AlgorithmError, HmacAlgorithm};

/// Computes an HMAC over the concatenation of `message` parts.
///
/// Parts are fed in order; feeding `[a, b]` is identical to feeding the
/// single part `a || b`.
///
/// ## Errors
///
/// Returns [`AlgorithmError::InvalidKey`] if the provider rejects the key.
/// HMAC accepts keys of any length, so this only surfaces provider bugs.
pub fn hmac(
    algorithm: HmacAlgorithm,
    key: &[u8],
    message: &[&[u8]],
) -> Result<Vec<u8>, AlgorithmError> {
    match algorithm {
        HmacAlgorithm::Md5 => mac::<Hmac<Md5>>(algorithm, key, message),
        HmacAlgorithm::Sha1 => mac::<Hmac<sha1::Sha1>>(algorithm, key, message),
        HmacAlgorithm::Sha224 => mac::<Hmac<sha2::Sha224>>(algorithm, key, message),
        HmacAlgorithm::Sha256 => mac::<Hmac<sha2::Sha256>>(algorithm, key, message),
        HmacAlgorithm::Sha384 => mac::<Hmac<sha2::Sha384>>(algorithm, key, message),
        HmacAlgorithm::Sha512 => mac::<Hmac<sha2::Sha512>>(algorithm, key, message),
        HmacAlgorithm::Sha512_224 => mac::<Hmac<sha2::Sha512_224>>(algorithm, key, message),
        HmacAlgorithm::Sha512_256 => mac::<Hmac<sha2::Sha512_256>>(algorithm, key, message),
        HmacAlgorithm::Sha3_224 => mac::<Hmac<sha3::Sha3_224>>(algorithm, key, message),
        HmacAlgorithm::Sha3_256 => mac::<Hmac<sha3::Sha3_256>>(algorithm, key, message),
        HmacAlgorithm::Sha3_384 => mac::<Hmac<sha3::Sha3_384>>(algorithm, key, message),
        HmacAlgorithm::Sha3_512 => mac::<Hmac<sha3::Sha3_512>>(algorithm, key, message),
    }
}

fn mac<M>(algorithm: HmacAlgorithm, key: &[u8], message: &[&[u8]]) -> Result<Vec<u8>, AlgorithmError>
where
    M: Mac + KeyInit,
{
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|e| AlgorithmError::InvalidKey {
        algorithm: algorithm.name(),
        reason: e.to_string(),
    })?;
    for part in message {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Derives a name-based (version 3) UUID from arbitrary bytes.
///
/// The bytes are hashed with MD5 and stamped with the version and
/// RFC 4122 variant bits, without a namespace prefix. This matches the
/// JDK `UUID.nameUUIDFromBytes` derivation, so identifiers stay stable
/// for relying parties migrated from the Java server.
#[must_use]
pub fn name_uuid_from_bytes(bytes: &[u8]) -> Uuid {
    let digest = Md5::digest(bytes);
    let mut md5_bytes = [0u8; 16];
    md5_bytes.copy_from_slice(&digest);
    Builder::from_md5_bytes(md5_bytes).into_uuid()
}
