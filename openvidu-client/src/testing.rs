//! Fixtures and a mock server shared by the tests.

use mockito::{Mock, ServerGuard};
use serde_json::{json, Value};

use crate::Server;

pub const SECRET: &str = "MY_SECRET";
/// `OPENVIDUAPP:MY_SECRET` in base64
pub const AUTHORIZATION: &str = "Basic T1BFTlZJRFVBUFA6TVlfU0VDUkVU";

pub fn config_payload() -> Value {
    json!({
        "version": "2.5.0",
        "openviduPublicurl": "https://localhost:4443/",
        "openviduCdr": false,
        "maxRecvBandwidth": 1000,
        "minRecvBandwidth": 300,
        "maxSendBandwidth": 1000,
        "minSendBandwidth": 300,
        "openviduRecording": true,
        "openviduRecordingVersion": "2.5.0",
        "openviduRecordingPath": "/opt/openvidu/recordings/",
        "openviduRecordingPublicAccess": false,
        "openviduRecordingNotification": "publisher_moderator",
        "openviduRecordingCustomLayout": "/opt/openvidu/custom-layout/",
        "openviduRecordingAutostopTimeout": 120,
        "openviduWebhook": true,
        "openviduWebhookEndpoint": "http://localhost:7777/webhook/",
        "openviduWebhookHeaders": [],
        "openviduWebhookEvents": ["sessionCreated", "recordingStatusChanged"]
    })
}

pub fn session_payload(id: &str, custom_id: &str) -> Value {
    json!({
        "sessionId": id,
        "createdAt": 1538481996019u64,
        "mediaMode": "ROUTED",
        "recordingMode": "MANUAL",
        "defaultOutputMode": "COMPOSED",
        "defaultRecordingLayout": "BEST_FIT",
        "customSessionId": custom_id,
        "connections": {
            "numberOfElements": 1,
            "content": [connection_payload("con_1")]
        },
        "recording": false
    })
}

pub fn connection_payload(id: &str) -> Value {
    json!({
        "connectionId": id,
        "createdAt": 1538481999022u64,
        "location": "unknown",
        "platform": "Chrome 69.0.3497.100 on Linux 64-bit",
        "role": "PUBLISHER",
        "clientData": "alice",
        "serverData": "",
        "token": format!("wss://localhost:4443?sessionId=room1&token={}", id),
        "publishers": [],
        "subscribers": []
    })
}

pub fn recording_payload(id: &str, size: u64, duration: f64, status: &str) -> Value {
    json!({
        "id": id,
        "sessionId": id,
        "name": id,
        "outputMode": "COMPOSED",
        "hasAudio": true,
        "hasVideo": true,
        "recordingLayout": "BEST_FIT",
        "resolution": "1920x1080",
        "createdAt": 1538483606521u64,
        "size": size,
        "duration": duration,
        "url": null,
        "status": status
    })
}

/// Starts a mock server answering the configuration request, and connects to it.
pub fn connect() -> (ServerGuard, Server) {
    let mut mock = mockito::Server::new();
    mock_json(&mut mock, "GET", "/config", 200, config_payload()).create();

    let server = Server::new(&mock.url(), SECRET, false).expect("connects to mock server");
    (mock, server)
}

/// Prepares an authenticated mock answering with a JSON body.
/// Call `create()` on the result to register it.
pub fn mock_json(server: &mut ServerGuard, method: &str, path: &str, status: usize, body: Value) -> Mock {
    server
        .mock(method, path)
        .match_header("authorization", AUTHORIZATION)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
}

/// Prepares an authenticated mock answering with a status and no body.
pub fn mock_status(server: &mut ServerGuard, method: &str, path: &str, status: usize) -> Mock {
    server
        .mock(method, path)
        .match_header("authorization", AUTHORIZATION)
        .with_status(status)
}
