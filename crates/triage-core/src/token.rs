//! Approval token codec.
//!
//! A token is a deterministic one-way hash of the ticket identifier and a
//! shared secret. It authorizes a single approve/reject transition without
//! a login session. There is no expiry and no revocation list: a minted
//! link stays valid until the shared secret is rotated.

use sha2::{Digest, Sha256};

/// Mint the approval token for a ticket.
pub fn mint(ticket_id: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ticket_id.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// Verify a presented token by recomputing it.
pub fn verify(ticket_id: &str, token: &str, secret: &str) -> bool {
    !token.is_empty() && mint(ticket_id, secret) == token
}
