//! Integrity fingerprints for uploaded files.
//!
//! The scheme depends on the filetype because each downstream update client
//! validates its own formats with its own mandated hash: `.nupkg` manifests
//! check a SHA-1 hex digest, while `.exe` and `.zip` updaters expect
//! SHA-512 in base64. Every other filetype carries no fingerprint.

use base64::Engine;
use sha1::Sha1;
use sha2::{Digest, Sha512};

/// Fingerprint scheme selected per filetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    /// SHA-1, hex encoded (legacy Windows manifest scheme)
    LegacySha1Hex,
    /// SHA-512, base64 encoded
    Sha512Base64,
    /// No fingerprint expected downstream
    None,
}

/// Select the fingerprint scheme for a filetype (leading dot included).
pub fn scheme_for(filetype: &str) -> HashScheme {
    match filetype {
        ".nupkg" => HashScheme::LegacySha1Hex,
        ".exe" | ".zip" => HashScheme::Sha512Base64,
        _ => HashScheme::None,
    }
}

/// Compute the fingerprint of `data` under the given scheme.
///
/// Returns an empty string for [`HashScheme::None`].
pub fn fingerprint(data: &[u8], scheme: HashScheme) -> String {
    match scheme {
        HashScheme::LegacySha1Hex => {
            let mut hasher = Sha1::new();
            hasher.update(data);
            format!("{:x}", hasher.finalize())
        }
        HashScheme::Sha512Base64 => {
            let mut hasher = Sha512::new();
            hasher.update(data);
            base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
        }
        HashScheme::None => String::new(),
    }
}
