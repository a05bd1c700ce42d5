// [libs/core/wallet/src/lib.rs]
//! A documented substitution for Algorand's proprietary 25-word
//! mnemonic scheme: standard Ed25519 keypairs plus a BIP-39 mnemonic,
//! with an Algorand-style application-account address derived as
//! `base32(SHA-512/256(pubkey))` truncated to the standard 58-char
//! form. See DESIGN.md for the Open Question this resolves.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand_core::OsRng;
use sha2::{Digest, Sha512_256};
use thiserror::Error;
use whistlechain_domain_models::WalletAddress;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid mnemonic phrase: {0}")]
    InvalidMnemonic(String),
    #[error("mnemonic did not yield 32 bytes of entropy")]
    ShortEntropy,
    #[error("signature verification failed")]
    BadSignature,
}

pub struct Wallet {
    signing_key: SigningKey,
    mnemonic: bip39::Mnemonic,
}

impl Wallet {
    /// Generates a fresh keypair and its backing mnemonic.
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let mnemonic =
            bip39::Mnemonic::from_entropy(&signing_key.to_bytes()).expect("32 bytes is valid entropy length");
        Self {
            signing_key,
            mnemonic,
        }
    }

    pub fn from_mnemonic(phrase: &str) -> Result<Self, WalletError> {
        let mnemonic = bip39::Mnemonic::parse_normalized(phrase)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        let entropy = mnemonic.to_entropy();
        if entropy.len() < 32 {
            return Err(WalletError::ShortEntropy);
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&entropy[..32]);
        let signing_key = SigningKey::from_bytes(&seed);
        Ok(Self {
            signing_key,
            mnemonic,
        })
    }

    pub fn mnemonic_phrase(&self) -> String {
        self.mnemonic.to_string()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn address(&self) -> WalletAddress {
        address_of(&self.verifying_key())
    }

    pub fn sign(&self, message: &[u8]) -> ed25519_dalek::Signature {
        self.signing_key.sign(message)
    }
}

/// Derives the application-account address for a public key the way
/// the on-chain box layer addresses it: `base32(SHA-512/256(pubkey))`,
/// matching Algorand's own address-encoding scheme so box lookups by
/// address stay consistent with spec.md §6.
pub fn address_of(key: &VerifyingKey) -> WalletAddress {
    let digest = Sha512_256::digest(key.as_bytes());
    let encoded = base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &digest);
    WalletAddress::from(encoded)
}

/// Derives the on-chain application account address for `app_id`,
/// mirroring Algorand's `encode_address(SHA-512/256(b"appID" ++ be64(app_id)))`.
pub fn application_account_address(app_id: u64) -> WalletAddress {
    let mut preimage = Vec::with_capacity(5 + 8);
    preimage.extend_from_slice(b"appID");
    preimage.extend_from_slice(&app_id.to_be_bytes());
    let digest = Sha512_256::digest(&preimage);
    let encoded = base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &digest);
    WalletAddress::from(encoded)
}

pub fn verify(key: &VerifyingKey, message: &[u8], signature: &ed25519_dalek::Signature) -> Result<(), WalletError> {
    use ed25519_dalek::Verifier;
    key.verify(message, signature).map_err(|_| WalletError::BadSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_round_trips_to_the_same_address() {
        let wallet = Wallet::generate();
        let phrase = wallet.mnemonic_phrase();
        let restored = Wallet::from_mnemonic(&phrase).unwrap();
        assert_eq!(wallet.address(), restored.address());
    }

    #[test]
    fn signature_verifies_against_its_own_key() {
        let wallet = Wallet::generate();
        let sig = wallet.sign(b"evidence-hash");
        assert!(verify(&wallet.verifying_key(), b"evidence-hash", &sig).is_ok());
    }

    #[test]
    fn application_account_address_is_deterministic() {
        assert_eq!(application_account_address(42), application_account_address(42));
        assert_ne!(application_account_address(42), application_account_address(43));
    }
}
