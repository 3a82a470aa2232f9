//! Simple test client for the unitdeck daemon.
//!
//! Run with: cargo run --example test_client
//!
//! Exercises:
//! 1. system.ping - Health check
//! 2. service.list - Service inventory
//! 3. service.status - Status of one unit
//! 4. unit_file.read - Read a unit's definition
//! 5. Invalid action rejection
//! 6. Invalid unit name rejection
//! 7. Unknown command

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;

const SOCKET_PATH: &str = "/run/unitdeck.sock";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== unitdeck Test Client ===\n");

    println!("Test 1: system.ping");
    let response = send_request("system.ping", serde_json::json!({}))?;
    println!("Response: {}\n", serde_json::to_string_pretty(&response)?);

    println!("Test 2: service.list");
    let response = send_request("service.list", serde_json::json!({}))?;
    match response["data"]["services"].as_array() {
        Some(services) => println!(
            "{} services, {} unparseable lines\n",
            services.len(),
            response["data"]["skipped_lines"]
        ),
        None => println!("Response: {}\n", serde_json::to_string_pretty(&response)?),
    }

    println!("Test 3: service.status (cron.service)");
    let response = send_request(
        "service.status",
        serde_json::json!({"unit": "cron.service"}),
    )?;
    println!("Response: {}\n", serde_json::to_string_pretty(&response)?);

    println!("Test 4: unit_file.read (ssh.service)");
    let response = send_request("unit_file.read", serde_json::json!({"unit": "ssh.service"}))?;
    match response["data"]["path"].as_str() {
        Some(path) => println!("Unit file at {}\n", path),
        None => println!("Response: {}\n", serde_json::to_string_pretty(&response)?),
    }

    println!("Test 5: invalid action (should be VALIDATION_ERROR)");
    let response = send_request(
        "service.control",
        serde_json::json!({"action": "mask", "unit": "cron.service"}),
    )?;
    println!("Response: {}\n", serde_json::to_string_pretty(&response)?);

    println!("Test 6: invalid unit name (should be VALIDATION_ERROR)");
    let response = send_request(
        "service.status",
        serde_json::json!({"unit": "cron; reboot"}),
    )?;
    println!("Response: {}\n", serde_json::to_string_pretty(&response)?);

    println!("Test 7: unknown command (should be UNKNOWN_COMMAND)");
    let response = send_request("service.teleport", serde_json::json!({}))?;
    println!("Response: {}\n", serde_json::to_string_pretty(&response)?);

    println!("=== Done ===");
    Ok(())
}

fn send_request(
    command: &str,
    params: serde_json::Value,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let request = serde_json::json!({
        "command": command,
        "params": params,
    });
    let payload = serde_json::to_vec(&request)?;

    let mut stream = UnixStream::connect(SOCKET_PATH)?;

    let length = payload.len() as u32;
    stream.write_all(&length.to_be_bytes())?;
    stream.write_all(&payload)?;
    stream.flush()?;

    let mut length_bytes = [0u8; 4];
    stream.read_exact(&mut length_bytes)?;
    let response_length = u32::from_be_bytes(length_bytes) as usize;

    let mut response_bytes = vec![0u8; response_length];
    stream.read_exact(&mut response_bytes)?;

    Ok(serde_json::from_slice(&response_bytes)?)
}
