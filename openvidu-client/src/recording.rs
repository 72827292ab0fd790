use chrono::{DateTime, Utc};
use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    request::Expectation, OpenViduResult, OutputMode, RecordingLayout, RecordingStatus, Server,
};

/// A recording as described by the server.
///
/// `size` and `duration` are zero until the server knows them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingData {
    pub id: String,
    #[serde(alias = "session_id")]
    pub session_id: String,
    #[serde(default)]
    pub name: String,
    pub output_mode: OutputMode,
    pub has_audio: bool,
    pub has_video: bool,
    pub recording_layout: Option<RecordingLayout>,
    pub custom_layout: Option<String>,
    pub resolution: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// In bytes
    #[serde(default)]
    pub size: u64,
    /// In seconds
    #[serde(default)]
    pub duration: f64,
    pub url: Option<String>,
    pub status: Option<RecordingStatus>,
}

/// Parameters for [crate::Session::start_recording]
#[derive(Debug, Clone)]
pub struct RecordingOptions {
    pub name: Option<String>,
    pub output_mode: OutputMode,
    pub has_audio: bool,
    pub has_video: bool,
    pub recording_layout: RecordingLayout,
    /// Only used with [RecordingLayout::Custom]
    pub custom_layout: Option<String>,
    /// Written as `WIDTHxHEIGHT`, for example `1920x1080`
    pub resolution: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordingRequest<'a> {
    pub session: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub output_mode: OutputMode,
    pub has_audio: bool,
    pub has_video: bool,
    pub recording_layout: RecordingLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_layout: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordingList {
    pub items: Vec<RecordingData>,
}

/// A recording job of a session on the server
#[derive(Debug, Clone)]
pub struct Recording<'a> {
    server: &'a Server,
    data: RecordingData,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            name: None,
            output_mode: OutputMode::Composed,
            has_audio: true,
            has_video: true,
            recording_layout: RecordingLayout::BestFit,
            custom_layout: None,
            resolution: None,
        }
    }
}

impl RecordingOptions {
    pub(crate) fn to_request<'a>(&'a self, session: &'a str) -> RecordingRequest<'a> {
        RecordingRequest {
            session,
            name: self.name.as_deref(),
            output_mode: self.output_mode,
            has_audio: self.has_audio,
            has_video: self.has_video,
            recording_layout: self.recording_layout,
            custom_layout: self.custom_layout.as_deref(),
            resolution: self.resolution.as_deref(),
        }
    }
}

impl<'a> Recording<'a> {
    pub(crate) fn new(server: &'a Server, data: RecordingData) -> Self {
        Self { server, data }
    }

    /// Fetches a recording by its id.
    pub fn fetch(server: &'a Server, id: &str) -> OpenViduResult<Self> {
        let data = get(server, id)?;
        Ok(Self::new(server, data))
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn session_id(&self) -> &str {
        &self.data.session_id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn output_mode(&self) -> OutputMode {
        self.data.output_mode
    }

    pub fn has_audio(&self) -> bool {
        self.data.has_audio
    }

    pub fn has_video(&self) -> bool {
        self.data.has_video
    }

    pub fn recording_layout(&self) -> Option<RecordingLayout> {
        self.data.recording_layout
    }

    pub fn custom_layout(&self) -> Option<&str> {
        self.data.custom_layout.as_deref()
    }

    pub fn resolution(&self) -> Option<&str> {
        self.data.resolution.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.data.created_at
    }

    /// The size of the recording in bytes, if known yet
    pub fn size(&self) -> Option<u64> {
        (self.data.size != 0).then_some(self.data.size)
    }

    /// The duration of the recording in seconds, if known yet
    pub fn duration(&self) -> Option<f64> {
        (self.data.duration != 0.0).then_some(self.data.duration)
    }

    pub fn url(&self) -> Option<&str> {
        self.data.url.as_deref()
    }

    pub fn status(&self) -> Option<RecordingStatus> {
        self.data.status
    }

    pub fn data(&self) -> &RecordingData {
        &self.data
    }

    /// Fetches the recording again, or another one if an id is given, replacing the current data.
    pub fn refresh(&mut self, id: Option<&str>) -> OpenViduResult<()> {
        let id = id.unwrap_or(self.id()).to_string();
        self.data = get(self.server, &id)?;

        Ok(())
    }

    /// Stops the recording. The data is replaced with what the server returns.
    pub fn stop(&mut self) -> OpenViduResult<()> {
        let path = ["api", "recordings", "stop", self.id()];
        let expectation = Expectation::status(200).fail_on(404, not_found(self.id()));

        let api = self.server.api();
        let response = api.send(api.request(Method::POST, &path), &expectation)?;
        self.data = response.json()?;

        info!("Recording `{}` stopped", self.id());
        Ok(())
    }

    /// Deletes the recording and its files from the server.
    pub fn delete(self) -> OpenViduResult<()> {
        let path = ["api", "recordings", self.id()];
        let expectation = Expectation::status(204)
            .fail_on(404, not_found(self.id()))
            .fail_on(409, format!("Recording `{}` is in `started` status", self.id()));

        let api = self.server.api();
        api.send(api.request(Method::DELETE, &path), &expectation)?;

        info!("Recording `{}` deleted", self.id());
        Ok(())
    }
}

pub(crate) fn list(server: &Server) -> OpenViduResult<Vec<Recording<'_>>> {
    let api = server.api();
    let response = api.send(
        api.request(Method::GET, &["api", "recordings"]),
        &Expectation::status(200),
    )?;

    let list: RecordingList = response.json()?;

    Ok(list
        .items
        .into_iter()
        .map(|data| Recording::new(server, data))
        .collect())
}

fn get(server: &Server, id: &str) -> OpenViduResult<RecordingData> {
    let path = ["api", "recordings", id];
    let expectation = Expectation::status(200).fail_on(404, not_found(id));

    let api = server.api();
    let response = api.send(api.request(Method::GET, &path), &expectation)?;

    Ok(response.json()?)
}

fn not_found(id: &str) -> String {
    format!("Recording `{}` does not exist", id)
}
