use chrono::{DateTime, Utc};
use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    recording::RecordingData, request::Expectation, token::TokenData, Connection, ConnectionData,
    MediaMode, OpenViduResult, OutputMode, Recording, RecordingLayout, RecordingMode,
    RecordingOptions, Server, Token, TokenOptions,
};

/// A session as described by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub session_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub media_mode: MediaMode,
    pub recording: bool,
    pub recording_mode: RecordingMode,
    pub default_output_mode: OutputMode,
    pub default_recording_layout: Option<RecordingLayout>,
    pub default_custom_layout: Option<String>,
    /// Empty when the server generated the id
    pub custom_session_id: Option<String>,
    #[serde(default)]
    pub connections: ConnectionList,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionList {
    #[serde(default)]
    pub number_of_elements: usize,
    #[serde(default)]
    pub content: Vec<ConnectionData>,
}

/// Parameters for [Server::create_session]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    pub media_mode: MediaMode,
    pub recording_mode: RecordingMode,
    /// When a session with this id already exists, it is used instead of creating a new one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_session_id: Option<String>,
    pub default_output_mode: OutputMode,
    pub default_recording_layout: RecordingLayout,
    pub default_custom_layout: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionList {
    pub content: Vec<SessionData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedSession {
    pub id: String,
}

/// A session on the server, holding the data from the last time it was fetched.
#[derive(Debug, Clone)]
pub struct Session<'a> {
    server: &'a Server,
    data: SessionData,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            media_mode: MediaMode::Routed,
            recording_mode: RecordingMode::Manual,
            custom_session_id: None,
            default_output_mode: OutputMode::Composed,
            default_recording_layout: RecordingLayout::BestFit,
            default_custom_layout: String::new(),
        }
    }
}

impl<'a> Session<'a> {
    pub(crate) fn new(server: &'a Server, data: SessionData) -> Self {
        Self { server, data }
    }

    /// Fetches a session by its id.
    pub fn fetch(server: &'a Server, id: &str) -> OpenViduResult<Self> {
        let data = get(server, id)?;
        Ok(Self::new(server, data))
    }

    pub fn id(&self) -> &str {
        &self.data.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.data.created_at
    }

    pub fn media_mode(&self) -> MediaMode {
        self.data.media_mode
    }

    /// Whether the session is being recorded right now
    pub fn recording(&self) -> bool {
        self.data.recording
    }

    pub fn recording_mode(&self) -> RecordingMode {
        self.data.recording_mode
    }

    pub fn default_output_mode(&self) -> OutputMode {
        self.data.default_output_mode
    }

    pub fn default_recording_layout(&self) -> Option<RecordingLayout> {
        self.data.default_recording_layout
    }

    pub fn default_custom_layout(&self) -> Option<&str> {
        self.data.default_custom_layout.as_deref()
    }

    pub fn custom_session_id(&self) -> Option<&str> {
        self.data
            .custom_session_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// The connections of the session, built from the current data.
    pub fn connections(&self) -> Vec<Connection<'a>> {
        self.data
            .connections
            .content
            .iter()
            .map(|data| Connection::new(self.server, self.id(), data.clone()))
            .collect()
    }

    pub fn connection(&self, id: &str) -> Option<Connection<'a>> {
        self.connections().into_iter().find(|c| c.id() == id)
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Fetches the session again, or another one if an id is given, replacing the current data.
    pub fn refresh(&mut self, id: Option<&str>) -> OpenViduResult<()> {
        let id = id.unwrap_or(self.id()).to_string();
        self.data = get(self.server, &id)?;

        Ok(())
    }

    /// Closes the session on the server, disconnecting every participant.
    /// The session should not be used afterwards.
    pub fn close(&self) -> OpenViduResult<()> {
        let api = self.server.api();
        let request = api.request(Method::DELETE, &["api", "sessions", self.id()]);
        api.send(request, &Expectation::status(204))?;

        info!("Session `{}` has been closed", self.id());
        Ok(())
    }

    pub fn generate_token(&self, options: &TokenOptions) -> OpenViduResult<Token> {
        let expectation = Expectation::status(200).fail_on(404, self.not_found());

        let api = self.server.api();
        let request = api
            .request(Method::POST, &["api", "tokens"])
            .json(&options.to_request(self.id()));

        let data: TokenData = api.send(request, &expectation)?.json()?;

        info!("Token created: `{}`", data.id);
        Ok(Token::new(data))
    }

    /// Forces a stream to stop being published.
    pub fn unpublish(&self, stream_id: &str) -> OpenViduResult<()> {
        let path = ["api", "sessions", self.id(), "stream", stream_id];
        let expectation = Expectation::status(204)
            .fail_on(400, self.not_found())
            .fail_on(404, format!("Stream `{}` does not exist", stream_id));

        let api = self.server.api();
        api.send(api.request(Method::POST, &path), &expectation)?;

        info!("Stream `{}` unpublished", stream_id);
        Ok(())
    }

    pub fn start_recording(&self, options: &RecordingOptions) -> OpenViduResult<Recording<'a>> {
        let id = self.id();
        let expectation = Expectation::status(200)
            .fail_on(422, "`resolution` exceeds acceptable values")
            .fail_on(404, self.not_found())
            .fail_on(
                406,
                format!("Session `{}` does not have connected participants", id),
            )
            .fail_on(
                409,
                format!(
                    "Session `{}` is not configured for using MediaMode ROUTED or it is already being recorded",
                    id
                ),
            )
            .fail_on(501, "OpenVidu Server recording module is disabled");

        let api = self.server.api();
        let request = api
            .request(Method::POST, &["api", "recordings", "start"])
            .json(&options.to_request(id));

        let data: RecordingData = api.send(request, &expectation)?.json()?;

        info!("Recording of session `{}` started", id);
        Ok(Recording::new(self.server, data))
    }

    fn not_found(&self) -> String {
        not_found(self.id())
    }
}

pub(crate) fn list(server: &Server) -> OpenViduResult<Vec<Session<'_>>> {
    let api = server.api();
    let response = api.send(
        api.request(Method::GET, &["api", "sessions"]),
        &Expectation::status(200),
    )?;

    let list: SessionList = response.json()?;

    Ok(list
        .content
        .into_iter()
        .map(|data| Session::new(server, data))
        .collect())
}

fn get(server: &Server, id: &str) -> OpenViduResult<SessionData> {
    let path = ["api", "sessions", id];
    let expectation = Expectation::status(200).fail_on(404, not_found(id));

    let api = server.api();
    let response = api.send(api.request(Method::GET, &path), &expectation)?;

    Ok(response.json()?)
}

fn not_found(id: &str) -> String {
    format!("Session `{}` does not exist", id)
}
