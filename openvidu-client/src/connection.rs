use chrono::{DateTime, Utc};
use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{request::Expectation, OpenViduResult, Role, Server};

/// A participant's connection record, as embedded in a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub connection_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub location: Option<String>,
    pub platform: String,
    pub role: Role,
    pub client_data: Option<String>,
    pub server_data: Option<String>,
    pub token: String,
    pub publishers: Option<Vec<Publisher>>,
    pub subscribers: Option<Vec<Subscriber>>,
}

/// A stream published by a connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    pub stream_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub media_options: PublisherMediaOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherMediaOptions {
    pub has_audio: Option<bool>,
    pub audio_active: Option<bool>,
    pub has_video: Option<bool>,
    pub video_active: Option<bool>,
    pub type_of_video: Option<String>,
    pub frame_rate: Option<f32>,
    pub video_dimensions: Option<String>,
    pub filter: Option<Value>,
}

/// A stream a connection is receiving
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub stream_id: String,
    /// The id of the connection publishing the stream
    pub publisher: String,
}

/// A snapshot of one participant in a session.
///
/// There is no way to refresh a connection. Once it is closed the snapshot is stale,
/// and the owning [crate::Session] should be refreshed instead.
#[derive(Debug, Clone)]
pub struct Connection<'a> {
    server: &'a Server,
    session_id: String,
    data: ConnectionData,
}

impl<'a> Connection<'a> {
    pub(crate) fn new(server: &'a Server, session_id: &str, data: ConnectionData) -> Self {
        Self {
            server,
            session_id: session_id.to_string(),
            data,
        }
    }

    pub fn id(&self) -> &str {
        &self.data.connection_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.data.created_at
    }

    pub fn location(&self) -> Option<&str> {
        self.data.location.as_deref()
    }

    pub fn platform(&self) -> &str {
        &self.data.platform
    }

    pub fn role(&self) -> Role {
        self.data.role
    }

    pub fn client_data(&self) -> Option<&str> {
        self.data.client_data.as_deref()
    }

    pub fn server_data(&self) -> Option<&str> {
        self.data.server_data.as_deref()
    }

    pub fn token(&self) -> &str {
        &self.data.token
    }

    pub fn publishers(&self) -> Option<&[Publisher]> {
        self.data.publishers.as_deref()
    }

    pub fn subscribers(&self) -> Option<&[Subscriber]> {
        self.data.subscribers.as_deref()
    }

    pub fn data(&self) -> &ConnectionData {
        &self.data
    }

    /// Forces the participant out of the session.
    pub fn disconnect(&self) -> OpenViduResult<()> {
        let path = ["api", "sessions", self.session_id.as_str(), "connection", self.id()];

        let expectation = Expectation::status(204)
            .fail_on(
                400,
                format!("Session `{}` does not exist", self.session_id),
            )
            .fail_on(404, format!("Connection `{}` does not exist", self.id()));

        let api = self.server.api();
        api.send(api.request(Method::POST, &path), &expectation)?;

        info!("Connection `{}` closed", self.id());
        Ok(())
    }
}
