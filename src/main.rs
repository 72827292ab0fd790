use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, ArgAction, Parser, Subcommand};
use colored::Colorize;
use log::{error, info};
use openvidu_client::{
    MediaMode, OutputMode, RecordingLayout, RecordingMode, RecordingOptions, Role, Server,
    SessionOptions, TokenOptions,
};
use serde::Serialize;

mod logging;

#[derive(Parser)]
#[command(name = "openvidu")]
#[command(about = "Manage sessions and recordings of an OpenVidu server", long_about = None)]
struct Cli {
    /// Base URL of the OpenVidu server
    #[arg(long, env = "OPENVIDU_URL")]
    url: String,

    /// Secret of the OpenVidu server
    #[arg(long, env = "OPENVIDU_SECRET", hide_env_values = true)]
    secret: String,

    /// Verify the certificate of the server
    #[arg(
        long,
        env = "OPENVIDU_VERIFY",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    verify: bool,

    /// Log every request
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the server configuration
    Config,

    /// List active sessions
    Sessions,

    /// Show a session
    Session { id: String },

    /// Create a session, or reuse the one with the given custom id
    CreateSession {
        #[arg(long)]
        custom_id: Option<String>,
        #[arg(long, default_value_t = MediaMode::Routed)]
        media_mode: MediaMode,
        #[arg(long, default_value_t = RecordingMode::Manual)]
        recording_mode: RecordingMode,
        #[arg(long, default_value_t = OutputMode::Composed)]
        output_mode: OutputMode,
        #[arg(long, default_value_t = RecordingLayout::BestFit)]
        layout: RecordingLayout,
        #[arg(long, default_value = "")]
        custom_layout: String,
    },

    /// Close a session and disconnect everyone in it
    Close { id: String },

    /// Generate a token to join a session
    Token {
        session: String,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        data: Option<String>,
        #[arg(long, default_value_t = 0)]
        min_send_bandwidth: u32,
        #[arg(long, default_value_t = 0)]
        max_send_bandwidth: u32,
        #[arg(long, default_value_t = 0)]
        min_recv_bandwidth: u32,
        #[arg(long, default_value_t = 0)]
        max_recv_bandwidth: u32,
        /// Filter the participant is allowed to apply, may be repeated
        #[arg(long = "filter")]
        filters: Vec<String>,
    },

    /// Force a participant out of a session
    Disconnect { session: String, connection: String },

    /// Force a stream to stop being published
    Unpublish { session: String, stream: String },

    /// List recordings
    Recordings,

    /// Show a recording
    Recording { id: String },

    /// Start recording a session
    StartRecording {
        session: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = OutputMode::Composed)]
        output_mode: OutputMode,
        #[arg(long)]
        no_audio: bool,
        #[arg(long)]
        no_video: bool,
        #[arg(long, default_value_t = RecordingLayout::BestFit)]
        layout: RecordingLayout,
        #[arg(long)]
        custom_layout: Option<String>,
        /// For example 1920x1080
        #[arg(long)]
        resolution: Option<String>,
    },

    /// Stop a recording
    StopRecording { id: String },

    /// Delete a stopped recording
    DeleteRecording { id: String },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    if let Err(error) = run(cli) {
        error!("{}", "Command failed!".bold().red());
        error!("{:#}", error);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let server = Server::new(&cli.url, &cli.secret, cli.verify)
        .with_context(|| format!("Could not connect to {}", cli.url))?;

    execute(&server, cli.command)
}

fn execute(server: &Server, command: Command) -> Result<()> {
    match command {
        Command::Config => print_json(server.config()),
        Command::Sessions => {
            let sessions = server.list_sessions()?;
            let data: Vec<_> = sessions.iter().map(|s| s.data()).collect();

            print_json(&data)
        }
        Command::Session { id } => print_json(server.fetch_session(&id)?.data()),
        Command::CreateSession {
            custom_id,
            media_mode,
            recording_mode,
            output_mode,
            layout,
            custom_layout,
        } => {
            let options = SessionOptions {
                media_mode,
                recording_mode,
                custom_session_id: custom_id,
                default_output_mode: output_mode,
                default_recording_layout: layout,
                default_custom_layout: custom_layout,
            };

            print_json(server.create_session(&options)?.data())
        }
        Command::Close { id } => server.fetch_session(&id)?.close().map_err(Into::into),
        Command::Token {
            session,
            role,
            data,
            min_send_bandwidth,
            max_send_bandwidth,
            min_recv_bandwidth,
            max_recv_bandwidth,
            filters,
        } => {
            let options = TokenOptions {
                role,
                data,
                video_min_send_bandwidth: min_send_bandwidth,
                video_max_send_bandwidth: max_send_bandwidth,
                video_min_recv_bandwidth: min_recv_bandwidth,
                video_max_recv_bandwidth: max_recv_bandwidth,
                allowed_filters: filters,
            };

            let token = server.fetch_session(&session)?.generate_token(&options)?;
            print_json(token.payload())
        }
        Command::Disconnect {
            session,
            connection,
        } => {
            let session = server.fetch_session(&session)?;
            let connection = session.connection(&connection).with_context(|| {
                format!(
                    "Connection `{}` is not in session `{}`",
                    connection,
                    session.id()
                )
            })?;

            connection.disconnect().map_err(Into::into)
        }
        Command::Unpublish { session, stream } => server
            .fetch_session(&session)?
            .unpublish(&stream)
            .map_err(Into::into),
        Command::Recordings => {
            let recordings = server.list_recordings()?;
            let data: Vec<_> = recordings.iter().map(|r| r.data()).collect();

            print_json(&data)
        }
        Command::Recording { id } => print_json(server.fetch_recording(&id)?.data()),
        Command::StartRecording {
            session,
            name,
            output_mode,
            no_audio,
            no_video,
            layout,
            custom_layout,
            resolution,
        } => {
            let options = RecordingOptions {
                name,
                output_mode,
                has_audio: !no_audio,
                has_video: !no_video,
                recording_layout: layout,
                custom_layout,
                resolution,
            };

            let recording = server.fetch_session(&session)?.start_recording(&options)?;
            print_json(recording.data())
        }
        Command::StopRecording { id } => {
            let mut recording = server.fetch_recording(&id)?;
            recording.stop()?;

            if let Some(status) = recording.status() {
                info!("Recording `{}` is now {}", id, status);
            }

            print_json(recording.data())
        }
        Command::DeleteRecording { id } => {
            server.fetch_recording(&id)?.delete().map_err(Into::into)
        }
    }
}

fn print_json<T>(value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string_pretty(value).context("Could not serialize the response")?;
    println!("{}", json);

    Ok(())
}
