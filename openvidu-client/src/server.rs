use log::info;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    recording,
    request::{Api, Expectation},
    session::{self, CreatedSession},
    OpenViduResult, Recording, Session, SessionOptions,
};

/// The configuration the server reports about itself.
///
/// Older servers leave out keys for features they predate. Those read as off or zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub version: String,
    #[serde(rename = "openviduPublicurl")]
    pub public_url: String,
    #[serde(rename = "openviduCdr")]
    pub cdr: bool,
    pub min_send_bandwidth: u32,
    pub max_send_bandwidth: u32,
    pub min_recv_bandwidth: u32,
    pub max_recv_bandwidth: u32,
    #[serde(rename = "openviduRecording")]
    pub recording: bool,
    #[serde(rename = "openviduRecordingPath")]
    pub recording_path: Option<String>,
    #[serde(rename = "openviduRecordingPublicAccess")]
    pub recording_public_access: Option<bool>,
    #[serde(rename = "openviduWebhook")]
    pub webhook: bool,
    #[serde(rename = "openviduWebhookEndpoint")]
    pub webhook_endpoint: Option<String>,
    #[serde(rename = "openviduWebhookEvents")]
    pub webhook_events: Option<Vec<String>>,
}

/// A connection to an OpenVidu server, and the entry point to everything on it.
///
/// Sessions, connections and recordings borrow the server they came from,
/// so it must outlive all of them.
#[derive(Debug)]
pub struct Server {
    api: Api,
    config: ServerConfig,
}

impl Server {
    /// Connects to the server at `url`, fetching its configuration.
    /// Certificates are not checked when `verify` is false.
    pub fn new(url: &str, secret: &str, verify: bool) -> OpenViduResult<Self> {
        let api = Api::new(url, secret, verify)?;

        let response = api.send(api.request(Method::GET, &["config"]), &Expectation::status(200))?;
        let config: ServerConfig = response.json()?;

        info!("Connected to OpenVidu {} at {}", config.version, api.url());
        Ok(Self { api, config })
    }

    pub(crate) fn api(&self) -> &Api {
        &self.api
    }

    pub fn url(&self) -> &str {
        self.api.url()
    }

    pub fn verify(&self) -> bool {
        self.api.verify()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn public_url(&self) -> &str {
        &self.config.public_url
    }

    /// Whether call detail records are enabled
    pub fn cdr(&self) -> bool {
        self.config.cdr
    }

    pub fn min_send_bandwidth(&self) -> u32 {
        self.config.min_send_bandwidth
    }

    pub fn max_send_bandwidth(&self) -> u32 {
        self.config.max_send_bandwidth
    }

    pub fn min_recv_bandwidth(&self) -> u32 {
        self.config.min_recv_bandwidth
    }

    pub fn max_recv_bandwidth(&self) -> u32 {
        self.config.max_recv_bandwidth
    }

    /// Whether the recording module is enabled
    pub fn recording(&self) -> bool {
        self.config.recording
    }

    pub fn webhook(&self) -> bool {
        self.config.webhook
    }

    /// Returns every active session.
    pub fn list_sessions(&self) -> OpenViduResult<Vec<Session<'_>>> {
        session::list(self)
    }

    pub fn fetch_session(&self, id: &str) -> OpenViduResult<Session<'_>> {
        Session::fetch(self, id)
    }

    /// Creates a session. If a custom id is given and a session with that id
    /// already exists, the existing session is returned.
    pub fn create_session(&self, options: &SessionOptions) -> OpenViduResult<Session<'_>> {
        let custom_id = options
            .custom_session_id
            .as_deref()
            .filter(|id| !id.is_empty());

        let mut expectation = Expectation::status(200);
        if custom_id.is_some() {
            expectation = expectation.or_status(409);
        }

        let request = self.api.request(Method::POST, &["api", "sessions"]).json(options);
        let response = self.api.send(request, &expectation)?;

        match custom_id {
            Some(id) if response.status() == StatusCode::CONFLICT => {
                info!("Using existing session `{}`", id);
                Session::fetch(self, id)
            }
            _ => {
                let created: CreatedSession = response.json()?;
                info!("Created new session `{}`", created.id);
                Session::fetch(self, &created.id)
            }
        }
    }

    /// Returns every recording on the server.
    pub fn list_recordings(&self) -> OpenViduResult<Vec<Recording<'_>>> {
        recording::list(self)
    }

    pub fn fetch_recording(&self, id: &str) -> OpenViduResult<Recording<'_>> {
        Recording::fetch(self, id)
    }
}

#[cfg(test)]
mod test {
    use mockito::Matcher;
    use serde_json::json;

    use crate::{
        testing::{self, mock_json, mock_status},
        MediaMode, OpenViduError, Server, SessionOptions,
    };

    #[test]
    fn config_is_projected() {
        let (_mock, server) = testing::connect();

        assert_eq!(server.version(), "2.5.0");
        assert_eq!(server.public_url(), "https://localhost:4443/");
        assert!(!server.cdr());
        assert_eq!(server.min_send_bandwidth(), 300);
        assert_eq!(server.max_send_bandwidth(), 1000);
        assert_eq!(server.min_recv_bandwidth(), 300);
        assert_eq!(server.max_recv_bandwidth(), 1000);
        assert!(server.recording());
        assert!(server.webhook());
        assert_eq!(
            server.config().webhook_endpoint.as_deref(),
            Some("http://localhost:7777/webhook/")
        );
        assert!(!server.verify());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let mut mock = mockito::Server::new();
        let _config = mock_json(&mut mock, "GET", "/config", 200, testing::config_payload()).create();

        let server = Server::new(&format!("{}/", mock.url()), testing::SECRET, true).unwrap();
        assert_eq!(server.url(), mock.url());
    }

    #[test]
    fn construction_fails_on_bad_config_response() {
        let mut mock = mockito::Server::new();
        let _config = mock
            .mock("GET", "/config")
            .with_status(401)
            .with_body(r#"{"status":401,"message":"Unauthorized"}"#)
            .create();

        let error = Server::new(&mock.url(), "wrong", false).unwrap_err();
        assert_eq!(error.to_string(), "401: Unauthorized");
    }

    #[test]
    fn config_without_newer_keys() {
        let mut payload = testing::config_payload();
        payload
            .as_object_mut()
            .unwrap()
            .retain(|key, _| !key.starts_with("openviduWebhook") && key != "openviduCdr");

        let mut mock = mockito::Server::new();
        let _config = mock_json(&mut mock, "GET", "/config", 200, payload).create();

        let server = Server::new(&mock.url(), testing::SECRET, true).unwrap();

        assert_eq!(server.version(), "2.5.0");
        assert!(server.recording());
        assert!(!server.webhook());
        assert!(!server.cdr());
        assert!(server.config().webhook_events.is_none());
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        let error = Server::new("http://127.0.0.1:1", testing::SECRET, true).unwrap_err();

        assert!(matches!(error, OpenViduError::Transport(_)));
        assert_eq!(error.status(), None);
    }

    #[test]
    fn invalid_url_is_rejected() {
        let error = Server::new("localhost:4443", testing::SECRET, true).unwrap_err();
        assert!(matches!(error, OpenViduError::Url(_)));
    }

    #[test]
    fn ids_are_encoded_in_paths() {
        let (mut mock, server) = testing::connect();

        let _fetch = mock_json(
            &mut mock,
            "GET",
            "/api/sessions/a%23b",
            200,
            testing::session_payload("a#b", "a#b"),
        )
        .create();

        // Must not be reached by cutting the id at `#`
        let truncated = mock_status(&mut mock, "GET", "/api/sessions/a", 200)
            .expect(0)
            .create();

        let session = server.fetch_session("a#b").unwrap();

        assert_eq!(session.id(), "a#b");
        truncated.assert();
    }

    #[test]
    fn list_sessions_uses_listed_payloads() {
        let (mut mock, server) = testing::connect();

        let list = mock_json(
            &mut mock,
            "GET",
            "/api/sessions",
            200,
            json!({
                "numberOfElements": 2,
                "content": [
                    testing::session_payload("room1", "room1"),
                    testing::session_payload("ses_Jd8tUyvhXO", "")
                ]
            }),
        )
        .expect(1)
        .create();

        // Any per-session fetch would hit this and fail the test
        let fetch = mock
            .mock("GET", Matcher::Regex(r"^/api/sessions/.+".to_string()))
            .expect(0)
            .create();

        let sessions = server.list_sessions().unwrap();

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id(), "room1");
        assert_eq!(sessions[0].custom_session_id(), Some("room1"));
        assert_eq!(sessions[1].id(), "ses_Jd8tUyvhXO");
        assert_eq!(sessions[1].custom_session_id(), None);

        list.assert();
        fetch.assert();
    }

    #[test]
    fn list_sessions_fails_on_error_status() {
        let (mut mock, server) = testing::connect();
        let _list = mock_status(&mut mock, "GET", "/api/sessions", 500).create();

        let error = server.list_sessions().unwrap_err();
        assert_eq!(error.to_string(), "500: Unknown error");
    }

    #[test]
    fn create_session_then_refresh_keeps_id() {
        let (mut mock, server) = testing::connect();

        let _create = mock_json(&mut mock, "POST", "/api/sessions", 200, json!({ "id": "ses_new" }))
            .match_body(Matcher::PartialJson(json!({
                "mediaMode": "RELAYED",
                "recordingMode": "MANUAL",
                "defaultOutputMode": "COMPOSED"
            })))
            .create();
        let fetch = mock_json(
            &mut mock,
            "GET",
            "/api/sessions/ses_new",
            200,
            testing::session_payload("ses_new", ""),
        )
        .expect(2)
        .create();

        let options = SessionOptions {
            media_mode: MediaMode::Relayed,
            ..Default::default()
        };

        let mut session = server.create_session(&options).unwrap();
        assert_eq!(session.id(), "ses_new");

        session.refresh(None).unwrap();
        assert_eq!(session.data().session_id, "ses_new");

        fetch.assert();
    }

    #[test]
    fn create_session_adopts_existing_custom_id() {
        let (mut mock, server) = testing::connect();

        let _create = mock_status(&mut mock, "POST", "/api/sessions", 409)
            .match_body(Matcher::PartialJson(json!({ "customSessionId": "X" })))
            .create();
        let _fetch = mock_json(
            &mut mock,
            "GET",
            "/api/sessions/X",
            200,
            testing::session_payload("X", "X"),
        )
        .create();

        let options = SessionOptions {
            custom_session_id: Some("X".to_string()),
            ..Default::default()
        };

        let session = server.create_session(&options).unwrap();
        assert_eq!(session.id(), "X");
        assert_eq!(session.custom_session_id(), Some("X"));
    }

    #[test]
    fn create_session_conflict_without_custom_id_fails() {
        let (mut mock, server) = testing::connect();
        let _create = mock_status(&mut mock, "POST", "/api/sessions", 409).create();

        let error = server.create_session(&SessionOptions::default()).unwrap_err();
        assert_eq!(error.status(), Some(409));
    }

    #[test]
    fn list_recordings() {
        let (mut mock, server) = testing::connect();
        let _list = mock_json(
            &mut mock,
            "GET",
            "/api/recordings",
            200,
            json!({
                "count": 2,
                "items": [
                    testing::recording_payload("room1", 0, 0.0, "started"),
                    testing::recording_payload("room2", 98765, 12.5, "ready")
                ]
            }),
        )
        .create();

        let recordings = server.list_recordings().unwrap();

        assert_eq!(recordings.len(), 2);
        assert_eq!(recordings[0].size(), None);
        assert_eq!(recordings[1].size(), Some(98765));
        assert_eq!(recordings[1].duration(), Some(12.5));
    }

    #[test]
    fn list_recordings_fails_on_error_status() {
        let (mut mock, server) = testing::connect();
        let _list = mock_json(
            &mut mock,
            "GET",
            "/api/recordings",
            501,
            json!({ "message": "Recording module is disabled" }),
        )
        .create();

        let error = server.list_recordings().unwrap_err();
        assert_eq!(error.to_string(), "501: Recording module is disabled");
    }
}
