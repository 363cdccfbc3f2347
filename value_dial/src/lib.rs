pub mod config;
pub mod coordinator;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod key;
pub mod locate;
pub mod numeric;
pub mod session;
pub mod tool;
pub mod traits;
pub mod types;

pub use crate::config::{Config, Palette};
pub use crate::dialect::{DialectKind, Registry, ValueKind, ValueRule};
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::error::ConfigError;
pub use crate::key::{Direction, InputEvent, Modifiers};
pub use crate::session::EditSession;
pub use crate::tool::{ColorChannel, NumberOptions, Target};
pub use crate::traits::{EditSink, TextSource, apply_commands};
pub use crate::types::{Command, Feedback, FeedbackValue, Position, Range, Span, TransactionId};
