//! Client side of the Connect-4 trainer: the game session state machine, the
//! HTTP transport to the move server and the async controller tying them to a
//! renderer.

pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod session;
pub mod transport;

pub use config::{load_settings, Settings};
pub use controller::{GameSessionController, SessionEvent, SessionHandle};
pub use error::{ClientError, ConfigError, ErrorClass};
pub use render::RenderAdapter;
pub use session::{Effect, GameSession, MoveReply, Phase, SessionOptions, SessionSnapshot};
pub use transport::{dispatch, GameServer, HttpGameServer};
