//! Enumerations shared by the entities, as they appear on the wire.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{value}` is not a valid {kind}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
            /// A value introduced by a newer server
            #[serde(other)]
            Unknown,
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown => "unknown",
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($wire) {
                        return Ok(Self::$variant);
                    }
                )+

                Err(ParseEnumError {
                    kind: stringify!($name),
                    value: s.to_string(),
                })
            }
        }
    };
}

wire_enum! {
    /// How media flows between participants of a session
    MediaMode {
        /// Media goes through the server
        Routed => "ROUTED",
        /// Media goes directly between peers
        Relayed => "RELAYED",
    }
}

wire_enum! {
    /// Whether a session is recorded as soon as the first participant publishes
    RecordingMode {
        Always => "ALWAYS",
        Manual => "MANUAL",
    }
}

wire_enum! {
    /// Whether a recording is a single composed file or one file per stream
    OutputMode {
        Composed => "COMPOSED",
        Individual => "INDIVIDUAL",
    }
}

wire_enum! {
    RecordingLayout {
        BestFit => "BEST_FIT",
        PictureInPicture => "PICTURE_IN_PICTURE",
        VerticalPresentation => "VERTICAL_PRESENTATION",
        HorizontalPresentation => "HORIZONTAL_PRESENTATION",
        Custom => "CUSTOM",
    }
}

wire_enum! {
    /// What a participant is allowed to do in a session
    Role {
        /// Can only subscribe to streams
        Subscriber => "SUBSCRIBER",
        /// Can subscribe and publish
        Publisher => "PUBLISHER",
        /// Can also force others to unpublish or disconnect
        Moderator => "MODERATOR",
    }
}

wire_enum! {
    /// Progress of a recording, driven by the server.
    /// Usually `starting`, `started`, `stopped` or `failed`, then `ready`.
    RecordingStatus {
        Starting => "starting",
        Started => "started",
        Stopped => "stopped",
        Ready => "ready",
        Failed => "failed",
    }
}

impl Default for MediaMode {
    fn default() -> Self {
        Self::Routed
    }
}

impl Default for RecordingMode {
    fn default() -> Self {
        Self::Manual
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::Composed
    }
}

impl Default for RecordingLayout {
    fn default() -> Self {
        Self::BestFit
    }
}

#[cfg(test)]
mod test {
    use super::{MediaMode, RecordingLayout, RecordingStatus, Role};

    #[test]
    fn wire_names() {
        let layout: RecordingLayout = serde_json::from_str(r#""PICTURE_IN_PICTURE""#).unwrap();
        assert_eq!(layout, RecordingLayout::PictureInPicture);

        let status: RecordingStatus = serde_json::from_str(r#""ready""#).unwrap();
        assert_eq!(status, RecordingStatus::Ready);

        assert_eq!(
            serde_json::to_string(&MediaMode::Relayed).unwrap(),
            r#""RELAYED""#
        );
    }

    #[test]
    fn unknown_values_are_tolerated() {
        let role: Role = serde_json::from_str(r#""SUPERVISOR""#).unwrap();
        assert_eq!(role, Role::Unknown);
    }

    #[test]
    fn parse_from_str() {
        assert_eq!("moderator".parse::<Role>(), Ok(Role::Moderator));
        assert_eq!("ROUTED".parse::<MediaMode>(), Ok(MediaMode::Routed));
        assert!("sideways".parse::<MediaMode>().is_err());
    }
}
