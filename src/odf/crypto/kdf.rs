//! Key derivation.
//!
//! The archive key is PBKDF2 (RFC 8018) with HMAC-SHA1 as PRF, fed with the
//! password checksum and the archive salt. This is the `PBKDF2` key
//! derivation named in ODF manifests.

use super::password::PasswordChecksum;
use crate::common::{Error, Result};
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key material for one archive. Wiped on drop, never printed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: Vec<u8>,
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey({} bytes, <redacted>)", self.bytes.len())
    }
}

/// Derive a `key_length`-byte key from the password checksum and salt.
///
/// Identical inputs always give the identical key, so a reader holding the
/// password and the manifest's salt and iteration count recomputes it.
pub fn derive_key(
    checksum: &PasswordChecksum,
    salt: &[u8],
    iterations: u32,
    key_length: usize,
) -> Result<DerivedKey> {
    if iterations == 0 {
        return Err(Error::InvalidConfiguration(
            "iteration count must be at least 1".to_string(),
        ));
    }
    if key_length == 0 {
        return Err(Error::InvalidConfiguration(
            "derived key length must be positive".to_string(),
        ));
    }
    if salt.is_empty() {
        return Err(Error::InvalidConfiguration("salt must not be empty".to_string()));
    }

    let mut bytes = vec![0u8; key_length];
    pbkdf2_hmac_sha1(checksum.as_bytes(), salt, iterations, &mut bytes);
    Ok(DerivedKey { bytes })
}

/// PBKDF2-HMAC-SHA1 filling `out`.
fn pbkdf2_hmac_sha1(password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
    pbkdf2_hmac::<Sha1>(password, salt, iterations, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::crypto::password::hash_password;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn pbkdf2(password: &[u8], salt: &[u8], iterations: u32, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        pbkdf2_hmac_sha1(password, salt, iterations, &mut out);
        out
    }

    fn checksum(password: &str) -> PasswordChecksum {
        let mut pw = password.as_bytes().to_vec();
        hash_password(&mut pw, "SHA-256").unwrap()
    }

    // RFC 6070 test vectors
    #[test]
    fn test_rfc6070_one_iteration() {
        assert_eq!(
            pbkdf2(b"password", b"salt", 1, 20),
            hex("0c60c80f961f0e71f3a9b524af6012062fe037a6")
        );
    }

    #[test]
    fn test_rfc6070_two_iterations() {
        assert_eq!(
            pbkdf2(b"password", b"salt", 2, 20),
            hex("ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957")
        );
    }

    #[test]
    fn test_rfc6070_4096_iterations() {
        assert_eq!(
            pbkdf2(b"password", b"salt", 4096, 20),
            hex("4b007901b765489abead49d926f721d065a429c1")
        );
    }

    #[test]
    fn test_rfc6070_multi_block_output() {
        assert_eq!(
            pbkdf2(
                b"passwordPASSWORDpassword",
                b"saltSALTsaltSALTsaltSALTsaltSALTsalt",
                4096,
                25
            ),
            hex("3d2eec4fe41c849b80c8d83662c0e44a8b291a964cf2f07038")
        );
    }

    #[test]
    fn test_key_length_matches_request() {
        let cs = checksum("secret");
        for len in [16, 24, 32] {
            assert_eq!(derive_key(&cs, &[1; 32], 10, len).unwrap().len(), len);
        }
    }

    #[test]
    fn test_salt_changes_key() {
        let cs = checksum("secret");
        let a = derive_key(&cs, &[1; 32], 10, 32).unwrap();
        let b = derive_key(&cs, &[2; 32], 10, 32).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let cs = checksum("secret");
        assert!(matches!(
            derive_key(&cs, &[1; 32], 0, 32),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            derive_key(&cs, &[1; 32], 10, 0),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            derive_key(&cs, &[], 10, 32),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = derive_key(&checksum("secret"), &[1; 8], 1, 16).unwrap();
        assert_eq!(format!("{:?}", key), "DerivedKey(16 bytes, <redacted>)");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn prop_derivation_is_deterministic(
                password in "[ -~]{1,24}",
                salt in prop::collection::vec(any::<u8>(), 1..48),
                iterations in 1u32..64,
                len in prop_oneof![Just(16usize), Just(24), Just(32)],
            ) {
                let cs = checksum(&password);
                let a = derive_key(&cs, &salt, iterations, len).unwrap();
                let b = derive_key(&cs, &salt, iterations, len).unwrap();
                prop_assert_eq!(a.as_bytes(), b.as_bytes());
            }
        }
    }
}
