//! Keyed hashing of client IP addresses for click events.

use std::net::IpAddr;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hashes client IPs with HMAC-SHA256 so raw addresses are never stored.
///
/// The same IP under the same secret always yields the same hash, which
/// keeps unique-visitor counting possible without retaining the address.
#[derive(Clone)]
pub struct IpHasher {
    mac: HmacSha256,
}

impl IpHasher {
    pub fn new(secret: &str) -> Self {
        let mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
        Self { mac }
    }

    /// Returns the 64-character lowercase hex MAC of the address.
    pub fn hash(&self, ip: IpAddr) -> String {
        let mut mac = self.mac.clone();
        mac.update(ip.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for IpHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpHasher").finish_non_exhaustive()
    }
}
