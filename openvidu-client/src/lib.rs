//! A blocking client for the REST API of an OpenVidu server.
//!
//! Everything starts from a [Server], which fetches the server configuration when it is created.
//! Sessions, connections and recordings borrow the server they came from.

mod connection;
mod error;
mod recording;
mod request;
mod server;
mod session;
mod token;
mod types;

#[cfg(test)]
mod testing;

pub use connection::*;
pub use error::*;
pub use recording::{Recording, RecordingData, RecordingOptions};
pub use request::USERNAME;
pub use server::*;
pub use session::{ConnectionList, Session, SessionData, SessionOptions};
pub use token::{KurentoOptions, Token, TokenData, TokenOptions};
pub use types::*;
