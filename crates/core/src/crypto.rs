//! Ed25519 cryptographic primitives for signing and verification.

use crate::hash::Hash;
use crate::ids::Specifier;
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stakechain_encoding::{
    read_compact_bytes, read_fixed_bytes, write_compact_bytes, write_fixed_bytes, CompactDecode,
    CompactEncode, EncodingError, FixedDecode, FixedEncode, MAX_SLICE_SIZE,
};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use thiserror::Error;

/// Size of an ed25519 public key.
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Size of an ed25519 secret key seed.
pub const SECRET_KEY_SIZE: usize = 32;
/// Size of an ed25519 signature.
pub const SIGNATURE_SIZE: usize = 64;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid signature size in transaction")]
    InvalidSignatureSize,
    #[error("invalid public key size in transaction")]
    InvalidPublicKeySize,
    #[error("unrecognized public key type in transaction")]
    UnrecognizedKeyType,
    #[error("entropy public keys cannot be used to sign or spend")]
    EntropyKey,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid public key string: {0}")]
    InvalidPublicKeyString(String),
    #[error("signature verification failed")]
    VerificationFailed,
}

/// The signature algorithm a public key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SignatureAlgoType {
    /// Nil (entropy) keys: valid on the wire, never able to sign.
    #[default]
    Nil = 0,
    Ed25519 = 1,
}

const SPECIFIER_ALGO_NIL: Specifier = Specifier::new(b"");
const SPECIFIER_ALGO_ED25519: Specifier = Specifier::new(b"ed25519");

impl SignatureAlgoType {
    pub fn specifier(&self) -> Specifier {
        match self {
            Self::Nil => SPECIFIER_ALGO_NIL,
            Self::Ed25519 => SPECIFIER_ALGO_ED25519,
        }
    }

    pub fn from_specifier(specifier: &Specifier) -> Option<Self> {
        match *specifier {
            SPECIFIER_ALGO_ED25519 => Some(Self::Ed25519),
            SPECIFIER_ALGO_NIL => Some(Self::Nil),
            _ => None,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Nil),
            1 => Some(Self::Ed25519),
            _ => None,
        }
    }

    pub fn name(&self) -> String {
        self.specifier().label()
    }
}

/// Raw binary data, hex encoded in JSON.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct ByteSlice(pub Vec<u8>);

impl ByteSlice {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(Self)
    }
}

impl From<Vec<u8>> for ByteSlice {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteSlice {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for ByteSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        if hex.len() > 16 {
            write!(f, "ByteSlice({}...)", &hex[..16])
        } else {
            write!(f, "ByteSlice({})", hex)
        }
    }
}

impl fmt::Display for ByteSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FixedEncode for ByteSlice {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        write_fixed_bytes(w, &self.0)
    }
}

impl FixedDecode for ByteSlice {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        read_fixed_bytes(r, MAX_SLICE_SIZE).map(Self)
    }
}

impl CompactEncode for ByteSlice {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        write_compact_bytes(w, &self.0)
    }
}

impl CompactDecode for ByteSlice {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        read_compact_bytes(r, MAX_SLICE_SIZE).map(Self)
    }
}

impl Serialize for ByteSlice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ByteSlice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ByteSlice::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A public key tagged with the algorithm it belongs to.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct PublicKey {
    pub algorithm: SignatureAlgoType,
    pub key: ByteSlice,
}

impl PublicKey {
    pub fn ed25519(key: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self {
            algorithm: SignatureAlgoType::Ed25519,
            key: ByteSlice(key.to_vec()),
        }
    }

    /// Verify a signature over a 32-byte hash.
    pub fn verify_hash(&self, hash: &Hash, signature: &[u8]) -> Result<(), CryptoError> {
        match self.algorithm {
            SignatureAlgoType::Nil => Err(CryptoError::EntropyKey),
            SignatureAlgoType::Ed25519 => {
                let key: [u8; PUBLIC_KEY_SIZE] = self
                    .key
                    .as_bytes()
                    .try_into()
                    .map_err(|_| CryptoError::InvalidPublicKeySize)?;
                if key == [0u8; PUBLIC_KEY_SIZE] {
                    return Err(CryptoError::InvalidPublicKey);
                }
                let sig: [u8; SIGNATURE_SIZE] = signature
                    .try_into()
                    .map_err(|_| CryptoError::InvalidSignatureSize)?;
                let verifying_key =
                    VerifyingKey::from_bytes(&key).map_err(|_| CryptoError::InvalidPublicKey)?;
                verifying_key
                    .verify(hash.as_bytes(), &DalekSignature::from_bytes(&sig))
                    .map_err(|_| CryptoError::VerificationFailed)
            }
        }
    }
}

/// Reject keys and signatures whose sizes do not match their algorithm.
pub fn strict_signature_check(public_key: &PublicKey, signature: &[u8]) -> Result<(), CryptoError> {
    match public_key.algorithm {
        SignatureAlgoType::Ed25519 => {
            if public_key.key.len() != PUBLIC_KEY_SIZE {
                return Err(CryptoError::InvalidPublicKeySize);
            }
            if signature.len() != SIGNATURE_SIZE {
                return Err(CryptoError::InvalidSignatureSize);
            }
            Ok(())
        }
        SignatureAlgoType::Nil => Err(CryptoError::UnrecognizedKeyType),
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.name(), self.key)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algo, key) = s
            .split_once(':')
            .ok_or_else(|| CryptoError::InvalidPublicKeyString(s.to_string()))?;
        let algorithm = match algo {
            "ed25519" => SignatureAlgoType::Ed25519,
            "" => SignatureAlgoType::Nil,
            other => {
                return Err(CryptoError::InvalidPublicKeyString(format!(
                    "unknown algorithm {}",
                    other
                )))
            }
        };
        let key = ByteSlice::from_hex(key)
            .map_err(|err| CryptoError::InvalidPublicKeyString(err.to_string()))?;
        Ok(Self { algorithm, key })
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// Fixed layout: 16-byte algorithm specifier, then the length-prefixed key.
impl FixedEncode for PublicKey {
    fn fixed_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        self.algorithm.specifier().fixed_encode(w)?;
        self.key.fixed_encode(w)
    }
}

impl FixedDecode for PublicKey {
    fn fixed_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        let specifier = Specifier::fixed_decode(r)?;
        let algorithm = SignatureAlgoType::from_specifier(&specifier).ok_or_else(|| {
            EncodingError::invalid(format!("unknown signature algorithm {:?}", specifier))
        })?;
        let key = ByteSlice::fixed_decode(r)?;
        Ok(Self { algorithm, key })
    }
}

// Compact layout: algorithm byte, then the raw key (absent for nil keys).
impl CompactEncode for PublicKey {
    fn compact_encode<W: Write + ?Sized>(&self, w: &mut W) -> stakechain_encoding::Result<()> {
        (self.algorithm as u8).compact_encode(w)?;
        if self.algorithm == SignatureAlgoType::Nil {
            return Ok(());
        }
        w.write_all(self.key.as_bytes())?;
        Ok(())
    }
}

impl CompactDecode for PublicKey {
    fn compact_decode<R: Read + ?Sized>(r: &mut R) -> stakechain_encoding::Result<Self> {
        let tag = u8::compact_decode(r)?;
        let algorithm = SignatureAlgoType::from_byte(tag).ok_or(EncodingError::UnknownTag {
            kind: "signature algorithm",
            tag,
        })?;
        let key = match algorithm {
            SignatureAlgoType::Nil => ByteSlice::default(),
            SignatureAlgoType::Ed25519 => {
                ByteSlice(<[u8; PUBLIC_KEY_SIZE]>::compact_decode(r)?.to_vec())
            }
        };
        Ok(Self { algorithm, key })
    }
}

/// A keypair for signing and verification.
pub struct KeyPair {
    signing_key: SigningKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Create a keypair from a 32-byte secret seed.
    pub fn from_secret_key(bytes: &[u8; SECRET_KEY_SIZE]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(bytes))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = PublicKey::ed25519(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Get the secret seed bytes.
    pub fn secret_key(&self) -> [u8; SECRET_KEY_SIZE] {
        self.signing_key.to_bytes()
    }

    /// Sign a 32-byte hash.
    pub fn sign_hash(&self, hash: &Hash) -> ByteSlice {
        ByteSlice(self.signing_key.sign(hash.as_bytes()).to_bytes().to_vec())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash;
    use stakechain_encoding::{from_compact_bytes, from_fixed_bytes, to_compact_bytes, to_fixed_bytes};

    #[test]
    fn test_sign_and_verify() {
        let keypair = KeyPair::generate();
        let msg = hash(b"message");
        let sig = keypair.sign_hash(&msg);
        assert_eq!(sig.len(), SIGNATURE_SIZE);
        assert!(keypair.public_key.verify_hash(&msg, sig.as_bytes()).is_ok());
    }

    #[test]
    fn test_wrong_message_fails() {
        let keypair = KeyPair::generate();
        let sig = keypair.sign_hash(&hash(b"one"));
        assert_eq!(
            keypair.public_key.verify_hash(&hash(b"two"), sig.as_bytes()),
            Err(CryptoError::VerificationFailed)
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let k1 = KeyPair::generate();
        let k2 = KeyPair::generate();
        let msg = hash(b"message");
        let sig = k1.sign_hash(&msg);
        assert!(k2.public_key.verify_hash(&msg, sig.as_bytes()).is_err());
    }

    #[test]
    fn test_entropy_key_cannot_verify() {
        let pk = PublicKey::default();
        assert_eq!(
            pk.verify_hash(&Hash::ZERO, &[0u8; 64]),
            Err(CryptoError::EntropyKey)
        );
    }

    #[test]
    fn test_keypair_from_secret() {
        let keypair = KeyPair::generate();
        let restored = KeyPair::from_secret_key(&keypair.secret_key());
        assert_eq!(keypair.public_key, restored.public_key);
    }

    #[test]
    fn test_strict_signature_check() {
        let pk = PublicKey::ed25519([1u8; 32]);
        assert!(strict_signature_check(&pk, &[0u8; 64]).is_ok());
        assert_eq!(
            strict_signature_check(&pk, &[0u8; 63]),
            Err(CryptoError::InvalidSignatureSize)
        );
        let short = PublicKey {
            algorithm: SignatureAlgoType::Ed25519,
            key: ByteSlice(vec![1u8; 31]),
        };
        assert_eq!(
            strict_signature_check(&short, &[0u8; 64]),
            Err(CryptoError::InvalidPublicKeySize)
        );
        assert_eq!(
            strict_signature_check(&PublicKey::default(), &[]),
            Err(CryptoError::UnrecognizedKeyType)
        );
    }

    #[test]
    fn test_public_key_string() {
        let pk = PublicKey::ed25519([0xab; 32]);
        let s = pk.to_string();
        assert_eq!(s, format!("ed25519:{}", "ab".repeat(32)));
        assert_eq!(s.parse::<PublicKey>().unwrap(), pk);
        assert!("ed25519".parse::<PublicKey>().is_err());
        assert!("rsa:00".parse::<PublicKey>().is_err());
    }

    #[test]
    fn test_public_key_fixed_layout() {
        let pk = PublicKey::ed25519([7u8; 32]);
        let bytes = to_fixed_bytes(&pk);
        assert_eq!(bytes.len(), 16 + 8 + 32);
        assert_eq!(&bytes[..7], b"ed25519");
        assert_eq!(bytes[16], 32);
        assert_eq!(from_fixed_bytes::<PublicKey>(&bytes).unwrap(), pk);
    }

    #[test]
    fn test_public_key_compact_layout() {
        let pk = PublicKey::ed25519([7u8; 32]);
        let bytes = to_compact_bytes(&pk).unwrap();
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 1);
        assert_eq!(from_compact_bytes::<PublicKey>(&bytes).unwrap(), pk);

        let nil = to_compact_bytes(&PublicKey::default()).unwrap();
        assert_eq!(nil, vec![0]);
        assert!(from_compact_bytes::<PublicKey>(&[9]).is_err());
    }

    #[test]
    fn test_byte_slice_json() {
        let bs = ByteSlice(vec![0xde, 0xad]);
        assert_eq!(serde_json::to_string(&bs).unwrap(), "\"dead\"");
        assert_eq!(serde_json::from_str::<ByteSlice>("\"dead\"").unwrap(), bs);
    }
}
