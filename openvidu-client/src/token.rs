use serde::{Deserialize, Serialize};

use crate::Role;

/// Bandwidth limits and filters attached to a token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KurentoOptions {
    #[serde(default)]
    pub video_min_send_bandwidth: u32,
    #[serde(default)]
    pub video_max_send_bandwidth: u32,
    #[serde(default)]
    pub video_min_recv_bandwidth: u32,
    #[serde(default)]
    pub video_max_recv_bandwidth: u32,
    #[serde(default)]
    pub allowed_filters: Vec<String>,
}

/// A token as returned by the server when it is created
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    /// The token itself
    pub id: String,
    pub session: String,
    pub role: Role,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub kurento_options: KurentoOptions,
}

/// Parameters for [crate::Session::generate_token]
#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
    /// Defaults to `PUBLISHER` on the server when not given
    pub role: Option<Role>,
    /// Opaque data handed to other participants
    pub data: Option<String>,
    pub video_min_send_bandwidth: u32,
    pub video_max_send_bandwidth: u32,
    pub video_min_recv_bandwidth: u32,
    pub video_max_recv_bandwidth: u32,
    pub allowed_filters: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenRequest<'a> {
    pub session: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a str>,
    pub kurento_options: KurentoOptions,
}

/// A credential for a participant to join a session.
/// Tokens are never fetched, they are only obtained by generating them.
#[derive(Debug, Clone)]
pub struct Token {
    data: TokenData,
}

impl TokenOptions {
    pub(crate) fn to_request<'a>(&'a self, session: &'a str) -> TokenRequest<'a> {
        TokenRequest {
            session,
            role: self.role,
            data: self.data.as_deref(),
            kurento_options: KurentoOptions {
                video_min_send_bandwidth: self.video_min_send_bandwidth,
                video_max_send_bandwidth: self.video_max_send_bandwidth,
                video_min_recv_bandwidth: self.video_min_recv_bandwidth,
                video_max_recv_bandwidth: self.video_max_recv_bandwidth,
                allowed_filters: self.allowed_filters.clone(),
            },
        }
    }
}

impl Token {
    pub(crate) fn new(data: TokenData) -> Self {
        Self { data }
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn session_id(&self) -> &str {
        &self.data.session
    }

    pub fn role(&self) -> Role {
        self.data.role
    }

    pub fn data(&self) -> &str {
        &self.data.data
    }

    pub fn video_min_send_bandwidth(&self) -> u32 {
        self.data.kurento_options.video_min_send_bandwidth
    }

    pub fn video_max_send_bandwidth(&self) -> u32 {
        self.data.kurento_options.video_max_send_bandwidth
    }

    pub fn video_min_recv_bandwidth(&self) -> u32 {
        self.data.kurento_options.video_min_recv_bandwidth
    }

    pub fn video_max_recv_bandwidth(&self) -> u32 {
        self.data.kurento_options.video_max_recv_bandwidth
    }

    pub fn allowed_filters(&self) -> &[String] {
        &self.data.kurento_options.allowed_filters
    }

    /// The raw payload this token was built from
    pub fn payload(&self) -> &TokenData {
        &self.data
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::{Token, TokenData, TokenOptions};
    use crate::Role;

    #[test]
    fn token_projection() {
        let data: TokenData = serde_json::from_value(json!({
            "id": "wss://localhost:4443?sessionId=room1&token=tok_abc",
            "session": "room1",
            "role": "MODERATOR",
            "data": "user=42",
            "kurentoOptions": {
                "videoMinSendBandwidth": 100,
                "videoMaxSendBandwidth": 1000,
                "videoMinRecvBandwidth": 200,
                "videoMaxRecvBandwidth": 2000,
                "allowedFilters": ["GStreamerFilter"]
            }
        }))
        .unwrap();

        let token = Token::new(data);

        assert_eq!(token.session_id(), "room1");
        assert_eq!(token.role(), Role::Moderator);
        assert_eq!(token.data(), "user=42");
        assert_eq!(token.video_min_send_bandwidth(), 100);
        assert_eq!(token.video_max_send_bandwidth(), 1000);
        assert_eq!(token.video_min_recv_bandwidth(), 200);
        assert_eq!(token.video_max_recv_bandwidth(), 2000);
        assert_eq!(token.allowed_filters(), ["GStreamerFilter".to_string()]);
    }

    #[test]
    fn request_nests_media_options() {
        let options = TokenOptions {
            role: Some(Role::Subscriber),
            video_max_recv_bandwidth: 500,
            ..Default::default()
        };

        let body = serde_json::to_value(options.to_request("room1")).unwrap();

        assert_eq!(
            body,
            json!({
                "session": "room1",
                "role": "SUBSCRIBER",
                "kurentoOptions": {
                    "videoMinSendBandwidth": 0,
                    "videoMaxSendBandwidth": 0,
                    "videoMinRecvBandwidth": 0,
                    "videoMaxRecvBandwidth": 500,
                    "allowedFilters": []
                }
            })
        );
    }
}
