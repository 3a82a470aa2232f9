//! Peer credential verification using SO_PEERCRED.
//!
//! Verifies that the connecting process is running as an allowed UID. The
//! daemon manages systemd units, so only Linux is supported.

use crate::error::{AuthErrorKind, PanelError};

/// Information about the connected peer.
#[derive(Debug, Clone)]
pub struct PeerInfo {
    /// User ID of the peer process.
    pub uid: u32,
    /// Group ID of the peer process.
    pub gid: u32,
    /// Process ID of the peer process.
    pub pid: i32,
}

/// Verify that the peer is authorized to connect.
///
/// Checks the peer's UID against the list of allowed UIDs.
/// Returns the peer info if authorized.
pub fn verify_peer<S: std::os::fd::AsFd>(
    stream: &S,
    allowed_uids: &[u32],
) -> Result<PeerInfo, PanelError> {
    use nix::sys::socket::{getsockopt, sockopt::PeerCredentials};

    let creds = getsockopt(stream, PeerCredentials).map_err(|e| PanelError::Socket {
        message: format!("Failed to get peer credentials: {}", e),
    })?;

    let peer = PeerInfo {
        uid: creds.uid(),
        gid: creds.gid(),
        pid: creds.pid(),
    };

    // An empty allow-list rejects everyone, never the reverse.
    if allowed_uids.is_empty() || !allowed_uids.contains(&peer.uid) {
        return Err(PanelError::Auth {
            kind: AuthErrorKind::UnauthorizedPeer { uid: peer.uid },
        });
    }

    Ok(peer)
}
