//! Per-entry cipher framing.
//!
//! One entry's compressed bytes become one AES-CBC ciphertext with a fresh
//! IV and ISO 10126 padding: 1 to 16 pad bytes, random except the last,
//! which holds the pad length. Padding is always added, so the ciphertext
//! is never the same length as the compressed input.

use super::kdf::DerivedKey;
use super::params::{AES_BLOCK_SIZE, ChecksumKind, EncryptionParameters, ONE_K};
use super::random::SecureRandom;
use crate::common::{Error, Result};
use aes::cipher::{BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use aes::{Aes128, Aes192, Aes256};
use sha2::{Digest, Sha256};
use std::io::Read;
use zeroize::Zeroize;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes192CbcEnc = cbc::Encryptor<Aes192>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// Length and digest of an entry's uncompressed plaintext, taken by the
/// writer before the bytes are deflated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaintextSummary {
    pub length: u64,
    pub sha256: Vec<u8>,
}

impl PlaintextSummary {
    pub fn of(data: &[u8]) -> Self {
        Self {
            length: data.len() as u64,
            sha256: Sha256::digest(data).to_vec(),
        }
    }
}

/// Output of [`encrypt_entry`]
#[derive(Debug, Clone)]
pub struct EncryptedEntry {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
    /// Checksum of the kind selected in the parameters
    pub checksum: Vec<u8>,
    /// Uncompressed plaintext length
    pub plain_len: u64,
    /// Compressed plaintext length, before padding
    pub compressed_len: u64,
}

/// Encrypt one entry's compressed stream.
///
/// `summary` describes the true plaintext the stream was compressed from.
/// With [`ChecksumKind::Sha256`] its digest is the recorded checksum; with
/// [`ChecksumKind::Sha256OneK`] the checksum is taken over the first 1024
/// compressed bytes.
///
/// # Errors
///
/// - [`Error::Io`] if reading `compressed` fails
/// - [`Error::RandomSource`] if the IV or padding cannot be drawn
/// - [`Error::CipherInitializationFailed`] if the key is not 16, 24 or 32
///   bytes long
pub fn encrypt_entry<R, G>(
    mut compressed: R,
    summary: &PlaintextSummary,
    params: &EncryptionParameters,
    key: &DerivedKey,
    rng: &mut G,
) -> Result<EncryptedEntry>
where
    R: Read,
    G: SecureRandom + ?Sized,
{
    let mut buffer = Vec::new();
    compressed.read_to_end(&mut buffer)?;
    let compressed_len = buffer.len() as u64;

    let checksum = match params.checksum() {
        ChecksumKind::Sha256 => summary.sha256.clone(),
        ChecksumKind::Sha256OneK => {
            let end = buffer.len().min(ONE_K);
            Sha256::digest(&buffer[..end]).to_vec()
        },
    };

    let mut iv = vec![0u8; params.iv_size()];
    rng.fill(&mut iv)?;

    if let Err(e) = pad_iso10126(&mut buffer, rng) {
        buffer.zeroize();
        return Err(e);
    }
    let ciphertext = cbc_encrypt(key.as_bytes(), &iv, &buffer);
    buffer.zeroize();

    Ok(EncryptedEntry {
        ciphertext: ciphertext?,
        iv,
        checksum,
        plain_len: summary.length,
        compressed_len,
    })
}

/// Append ISO 10126 padding so the length is a multiple of the block size.
fn pad_iso10126<G: SecureRandom + ?Sized>(buffer: &mut Vec<u8>, rng: &mut G) -> Result<()> {
    let pad_len = AES_BLOCK_SIZE - buffer.len() % AES_BLOCK_SIZE;
    let mut pad = [0u8; AES_BLOCK_SIZE];
    rng.fill(&mut pad[..pad_len - 1])?;
    pad[pad_len - 1] = pad_len as u8;
    buffer.extend_from_slice(&pad[..pad_len]);
    Ok(())
}

fn cbc_encrypt(key: &[u8], iv: &[u8], padded: &[u8]) -> Result<Vec<u8>> {
    let invalid = |_| {
        Error::CipherInitializationFailed(format!(
            "invalid AES-CBC key/iv ({} byte key, {} byte iv)",
            key.len(),
            iv.len()
        ))
    };

    // NoPadding because the buffer is already padded
    let ciphertext = match key.len() {
        16 => Aes128CbcEnc::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<NoPadding>(padded),
        24 => Aes192CbcEnc::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<NoPadding>(padded),
        32 => Aes256CbcEnc::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<NoPadding>(padded),
        other => {
            return Err(Error::CipherInitializationFailed(format!(
                "unsupported AES key size: {other} bytes"
            )));
        },
    };
    Ok(ciphertext)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Reference decryption used to check what the writer produced.

    use aes::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
    use aes::{Aes128, Aes192, Aes256};

    /// Decrypt AES-CBC, leaving the padding in place.
    pub(crate) fn decrypt_raw(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Vec<u8> {
        match key.len() {
            16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
                .unwrap()
                .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
                .unwrap(),
            24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
                .unwrap()
                .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
                .unwrap(),
            _ => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
                .unwrap()
                .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
                .unwrap(),
        }
    }

    /// Decrypt AES-CBC and strip ISO 10126 padding.
    pub(crate) fn decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Vec<u8> {
        let mut plain = decrypt_raw(key, iv, ciphertext);
        let pad_len = *plain.last().unwrap() as usize;
        assert!((1..=16).contains(&pad_len), "bad pad length {pad_len}");
        plain.truncate(plain.len() - pad_len);
        plain
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{decrypt, decrypt_raw};
    use super::*;
    use crate::odf::crypto::kdf::derive_key;
    use crate::odf::crypto::password::hash_password;
    use crate::odf::crypto::random::OsRandom;
    use crate::odf::crypto::random::testing::{CountingRandom, FailingRandom};

    /// Hands out the queued byte patterns in order, one per call.
    struct ScriptedRandom {
        fills: Vec<Vec<u8>>,
    }

    impl SecureRandom for ScriptedRandom {
        fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
            let next = self.fills.remove(0);
            dest.copy_from_slice(&next[..dest.len()]);
            Ok(())
        }
    }

    fn key(size: usize) -> DerivedKey {
        let mut pw = b"secret".to_vec();
        let checksum = hash_password(&mut pw, "SHA-256").unwrap();
        derive_key(&checksum, &[3; 16], 2, size).unwrap()
    }

    fn params(size: usize) -> EncryptionParameters {
        EncryptionParameters::builder().key_size(size).build().unwrap()
    }

    #[test]
    fn test_round_trip_all_key_sizes() {
        let data = b"<office:document/>";
        for size in [16, 24, 32] {
            let key = key(size);
            let out = encrypt_entry(
                &data[..],
                &PlaintextSummary::of(data),
                &params(size),
                &key,
                &mut CountingRandom::default(),
            )
            .unwrap();
            assert_eq!(decrypt(key.as_bytes(), &out.iv, &out.ciphertext), data);
        }
    }

    #[test]
    fn test_padding_always_added() {
        let key = key(32);
        for len in [0usize, 1, 15, 16, 17, 32] {
            let data = vec![0xAB; len];
            let out = encrypt_entry(
                &data[..],
                &PlaintextSummary::of(&data),
                &params(32),
                &key,
                &mut CountingRandom::default(),
            )
            .unwrap();
            assert_eq!(out.ciphertext.len(), (len / 16 + 1) * 16);
            assert_eq!(out.compressed_len, len as u64);
            assert_eq!(out.iv.len(), 16);
        }
    }

    #[test]
    fn test_checksum_kinds() {
        let key = key(32);
        let plain = b"uncompressed plaintext";
        let compressed = vec![0x42u8; 3000];
        let summary = PlaintextSummary::of(plain);

        let full = encrypt_entry(
            &compressed[..],
            &summary,
            &params(32),
            &key,
            &mut CountingRandom::default(),
        )
        .unwrap();
        assert_eq!(full.checksum, Sha256::digest(plain).to_vec());
        assert_eq!(full.plain_len, plain.len() as u64);

        let one_k = EncryptionParameters::builder()
            .checksum(ChecksumKind::Sha256OneK)
            .build()
            .unwrap();
        let partial =
            encrypt_entry(&compressed[..], &summary, &one_k, &key, &mut CountingRandom::default())
                .unwrap();
        assert_eq!(partial.checksum, Sha256::digest(&compressed[..1024]).to_vec());
    }

    #[test]
    fn test_padding_filler_comes_from_random_source() {
        let key = key(32);
        let data = b"abc";
        let filler: Vec<u8> = (0xA0..0xB0).collect();
        let mut rng = ScriptedRandom {
            fills: vec![vec![0x07; 16], filler.clone()],
        };
        let out = encrypt_entry(&data[..], &PlaintextSummary::of(data), &params(32), &key, &mut rng)
            .unwrap();
        assert_eq!(out.iv, vec![0x07; 16]);

        let padded = decrypt_raw(key.as_bytes(), &out.iv, &out.ciphertext);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[..3], data);
        assert_eq!(&padded[3..15], &filler[..12]);
        assert_eq!(padded[15], 13);
    }

    #[test]
    fn test_padding_filler_is_not_fixed() {
        let key = key(32);
        let data = b"x";
        let mut fillers = Vec::new();
        for _ in 0..2 {
            let out = encrypt_entry(
                &data[..],
                &PlaintextSummary::of(data),
                &params(32),
                &key,
                &mut OsRandom,
            )
            .unwrap();
            let padded = decrypt_raw(key.as_bytes(), &out.iv, &out.ciphertext);
            assert_eq!(padded[15], 15);
            let filler = padded[1..15].to_vec();
            assert!(filler.iter().any(|&b| b != 0));
            fillers.push(filler);
        }
        assert_ne!(fillers[0], fillers[1]);
    }

    #[test]
    fn test_same_input_gives_different_ciphertext() {
        let key = key(32);
        let data = b"same bytes";
        let mut rng = CountingRandom::default();
        let a = encrypt_entry(&data[..], &PlaintextSummary::of(data), &params(32), &key, &mut rng)
            .unwrap();
        let b = encrypt_entry(&data[..], &PlaintextSummary::of(data), &params(32), &key, &mut rng)
            .unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_random_failure_propagates() {
        let key = key(32);
        let data = b"x";
        // IV succeeds, padding draw fails
        let mut rng = FailingRandom { budget: 1 };
        let err = encrypt_entry(&data[..], &PlaintextSummary::of(data), &params(32), &key, &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::RandomSource(_)));
    }

    #[test]
    fn test_bad_key_length_is_cipher_error() {
        assert!(matches!(
            cbc_encrypt(&[0; 20], &[0; 16], &[0; 16]),
            Err(Error::CipherInitializationFailed(_))
        ));
        assert!(matches!(
            cbc_encrypt(&[0; 32], &[0; 8], &[0; 16]),
            Err(Error::CipherInitializationFailed(_))
        ));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_encrypt_then_decrypt_is_identity(
                data in prop::collection::vec(any::<u8>(), 0..2048),
                size in prop_oneof![Just(16usize), Just(24), Just(32)],
            ) {
                let key = key(size);
                let out = encrypt_entry(
                    &data[..],
                    &PlaintextSummary::of(&data),
                    &params(size),
                    &key,
                    &mut CountingRandom::default(),
                )
                .unwrap();
                prop_assert_eq!(out.ciphertext.len() % 16, 0);
                prop_assert_eq!(decrypt(key.as_bytes(), &out.iv, &out.ciphertext), data);
            }
        }
    }
}
