//! Authentication module.
//!
//! Callers are identified by Unix socket peer credentials; there is no
//! application-level credential exchange.

mod peer_creds;

pub use peer_creds::{verify_peer, PeerInfo};
