//! HMAC keys for TSIG.

use super::Signer;
use crate::base::name::Name;
use crate::utils::base64;
use bytes::Bytes;
use core::{cmp, fmt, str};
use ring::hmac;

//------------ Key -----------------------------------------------------------

/// A shared secret for HMAC signatures.
///
/// Both sides know the key by its name, which is sent along with every
/// signature.
#[derive(Debug)]
pub struct Key {
    key: hmac::Key,
    algorithm: Algorithm,
    algorithm_name: Name,
    name: Name,
}

impl Key {
    pub fn new(algorithm: Algorithm, secret: &[u8], name: Name) -> Self {
        Key {
            key: hmac::Key::new(algorithm.into_hmac_algorithm(), secret),
            algorithm,
            algorithm_name: algorithm.to_name(),
            name,
        }
    }

    /// Creates a key from the Base 64 form found in key files.
    pub fn from_base64(
        algorithm: Algorithm,
        secret: &str,
        name: Name,
    ) -> Result<Self, base64::DecodeError> {
        let secret = base64::decode(secret)?;
        Ok(Self::new(algorithm, &secret, name))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn name(&self) -> &Name {
        &self.name
    }
}

impl Signer for Key {
    fn key_name(&self) -> &Name {
        &self.name
    }

    fn algorithm(&self) -> &Name {
        &self.algorithm_name
    }

    fn sign(&self, data: &[u8]) -> Bytes {
        Bytes::copy_from_slice(hmac::sign(&self.key, data).as_ref())
    }

    fn verify(&self, data: &[u8], mac: &[u8]) -> bool {
        if !self.algorithm.within_len_bounds(mac.len()) {
            return false;
        }
        let tag = hmac::sign(&self.key, data);
        ring::constant_time::verify_slices_are_equal(
            &tag.as_ref()[..mac.len()],
            mac,
        )
        .is_ok()
    }
}

//------------ Algorithm -----------------------------------------------------

/// The HMAC variants we can sign with.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Algorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

const NAMES: [(Algorithm, &str); 4] = [
    (Algorithm::Sha1, "hmac-sha1"),
    (Algorithm::Sha256, "hmac-sha256"),
    (Algorithm::Sha384, "hmac-sha384"),
    (Algorithm::Sha512, "hmac-sha512"),
];

impl Algorithm {
    /// Looks up the algorithm from the name used in TSIG records.
    pub fn from_name(name: &Name) -> Option<Self> {
        if name.label_count() != 1 {
            return None;
        }
        let first = name.first()?.to_ascii_lowercase();
        str::from_utf8(&first).ok()?.parse().ok()
    }

    fn into_hmac_algorithm(self) -> hmac::Algorithm {
        match self {
            Algorithm::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            Algorithm::Sha256 => hmac::HMAC_SHA256,
            Algorithm::Sha384 => hmac::HMAC_SHA384,
            Algorithm::Sha512 => hmac::HMAC_SHA512,
        }
    }

    fn as_str(self) -> &'static str {
        NAMES
            .iter()
            .find(|(alg, _)| *alg == self)
            .map_or("", |(_, name)| *name)
    }

    /// The single-label name used in TSIG records.
    pub fn to_name(self) -> Name {
        Name::from_labels([self.as_str().as_bytes()])
            .unwrap_or_else(|_| Name::root())
    }

    /// The length of an untruncated MAC.
    pub fn native_len(self) -> usize {
        self.into_hmac_algorithm().digest_algorithm().output_len()
    }

    /// Whether a MAC of `len` octets is acceptable.
    ///
    /// RFC 4635 allows truncation down to half the length or 10 octets,
    /// whichever is larger.
    pub fn within_len_bounds(self, len: usize) -> bool {
        len >= cmp::max(10, self.native_len() / 2) && len <= self.native_len()
    }
}

impl str::FromStr for Algorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(alg, _)| *alg)
            .ok_or(AlgorithmError)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//------------ AlgorithmError ------------------------------------------------

/// The name of an algorithm we don’t support.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AlgorithmError;

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unsupported TSIG algorithm")
    }
}

impl std::error::Error for AlgorithmError {}

//============ Testing =======================================================
