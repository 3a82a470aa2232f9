//! Per-connection handler.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{verify_peer, PeerInfo};
use crate::commands::{CommandParams, CommandRegistry, ExecutionContext};
use crate::config::Settings;
use crate::error::{PanelError, ProtocolErrorKind};
use crate::protocol::{read_message_with_timeout, write_message_with_timeout, Request, Response};

/// Handle a single client connection.
pub async fn handle_connection(
    stream: UnixStream,
    settings: Arc<Settings>,
    command_registry: Arc<CommandRegistry>,
) -> Result<(), PanelError> {
    // Verify peer credentials before reading a single byte
    let peer = verify_peer(&stream, &settings.security.allowed_peer_uids)?;
    debug!(uid = peer.uid, gid = peer.gid, pid = peer.pid, "Peer authenticated");

    // Split into read/write halves
    let (mut reader, mut writer) = stream.into_split();

    // Process requests in a loop
    loop {
        let result = process_request(
            &mut reader,
            &mut writer,
            &settings,
            &command_registry,
            &peer,
        )
        .await;

        match result {
            Ok(()) => continue,
            Err(PanelError::Protocol {
                kind: ProtocolErrorKind::ConnectionClosed,
            }) => {
                debug!(uid = peer.uid, "Client disconnected");
                return Ok(());
            }
            Err(PanelError::Protocol {
                kind: ProtocolErrorKind::ConnectionTimeout,
            }) => {
                warn!(uid = peer.uid, "Connection timed out");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }
}

/// Process a single request from the client.
async fn process_request<R, W>(
    reader: &mut R,
    writer: &mut W,
    settings: &Settings,
    command_registry: &Arc<CommandRegistry>,
    peer: &PeerInfo,
) -> Result<(), PanelError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    // Read the incoming message with timeout
    let socket_timeout = Duration::from_secs(settings.limits.socket_timeout_seconds);
    let msg = read_message_with_timeout(reader, settings.limits.max_message_size, socket_timeout).await?;

    let request_id = Uuid::new_v4();

    // Parse the request; a malformed frame gets an error response, not a
    // dropped connection.
    let request: Request = match serde_json::from_slice(&msg) {
        Ok(request) => request,
        Err(e) => {
            warn!(request_id = %request_id, uid = peer.uid, error = %e, "Malformed request");
            let response = Response::error_with_id(
                request_id,
                "PROTOCOL_ERROR",
                format!("Invalid JSON: {}", e),
            );
            let response_bytes = serde_json::to_vec(&response)?;
            write_message_with_timeout(writer, &response_bytes, socket_timeout).await?;
            return Ok(());
        }
    };

    info!(
        request_id = %request_id,
        command = %request.command,
        uid = peer.uid,
        "Received request"
    );

    let ctx = ExecutionContext::new(request_id, peer.clone(), request.command.clone());
    let params = CommandParams::new(request.params.clone());

    // Dispatch to command handler using spawn_blocking for sync commands
    let registry = Arc::clone(command_registry);
    let command_name = request.command.clone();
    let command_timeout = registry
        .get(&command_name)
        .map(|cmd| cmd.timeout())
        .unwrap_or(Duration::from_secs(60));

    let result = tokio::time::timeout(
        command_timeout,
        tokio::task::spawn_blocking(move || registry.dispatch(&ctx, &command_name, params)),
    )
    .await;

    let response = match result {
        Ok(Ok(Ok(cmd_result))) => {
            info!(
                request_id = %request_id,
                command = %request.command,
                success = cmd_result.success,
                "Command executed"
            );

            if cmd_result.success {
                Response::success_with_id(
                    request_id,
                    cmd_result.data.unwrap_or(serde_json::json!({})),
                )
            } else {
                Response::error_with_id(
                    request_id,
                    cmd_result
                        .error_code
                        .unwrap_or_else(|| "COMMAND_ERROR".to_string()),
                    cmd_result
                        .error_message
                        .unwrap_or_else(|| "Unknown error".to_string()),
                )
            }
        }
        Ok(Ok(Err(e))) => {
            warn!(
                request_id = %request_id,
                command = %request.command,
                code = e.code(),
                error = %e,
                "Command failed"
            );

            Response::error_with_id(request_id, e.code(), e.to_string())
        }
        Ok(Err(e)) => {
            error!(
                request_id = %request_id,
                command = %request.command,
                error = %e,
                "Command task panicked"
            );

            Response::error_with_id(request_id, "INTERNAL_ERROR", "Command execution failed")
        }
        Err(_) => {
            error!(
                request_id = %request_id,
                command = %request.command,
                timeout_secs = command_timeout.as_secs(),
                "Command dispatch timed out"
            );

            Response::error_with_id(
                request_id,
                "COMMAND_TIMEOUT",
                format!(
                    "Command timed out after {} seconds",
                    command_timeout.as_secs()
                ),
            )
        }
    };

    // Send the response with timeout
    let response_bytes = serde_json::to_vec(&response)?;
    write_message_with_timeout(writer, &response_bytes, socket_timeout).await?;

    Ok(())
}
