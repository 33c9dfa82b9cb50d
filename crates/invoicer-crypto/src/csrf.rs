use std::fmt;

use anyhow::{Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of the signing key.
pub const KEY_LEN: usize = 32;

/// Length in bytes of the random message inside each token.
const MSG_LEN: usize = 32;

const SEPARATOR: char = '$';

/// Issues and checks CSRF tokens of the form `base64(msg)$base64(mac)`,
/// where `mac = HMAC-SHA256(key, msg)`.
///
/// The key is fixed for the lifetime of the service. Tokens carry no expiry
/// and stay valid for as long as the key does.
#[derive(Clone)]
pub struct CsrfService {
    key: [u8; KEY_LEN],
}

impl CsrfService {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Creates a service with a fresh random key.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut key);
        Self::new(key)
    }

    /// Creates a service from a base64-encoded 32-byte key.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64.decode(encoded.trim())?;
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| anyhow!("CSRF key must be {} bytes", KEY_LEN))?;
        Ok(Self::new(key))
    }

    pub fn create(&self) -> String {
        let mut msg = [0u8; MSG_LEN];
        rand::rng().fill_bytes(&mut msg);

        let mut mac = self.mac();
        mac.update(&msg);
        let tag = mac.finalize().into_bytes();

        format!("{}{}{}", BASE64.encode(msg), SEPARATOR, BASE64.encode(tag))
    }

    pub fn verify(&self, token: &str) -> bool {
        let mut parts = token.split(SEPARATOR);
        let (Some(msg), Some(tag), None) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };

        let (Ok(msg), Ok(tag)) = (BASE64.decode(msg), BASE64.decode(tag)) else {
            return false;
        };

        let mut mac = self.mac();
        mac.update(&msg);
        // Constant-time comparison
        mac.verify_slice(&tag).is_ok()
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }
}

impl fmt::Debug for CsrfService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfService").finish_non_exhaustive()
    }
}
