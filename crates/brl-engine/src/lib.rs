#![warn(clippy::pedantic)]

pub mod arena;
pub mod engine;
pub mod error;
pub mod limits;
pub mod message;
pub mod result_state;

pub use arena::{ArenaError, OutputArena};
pub use engine::{Decompressed, Decompressor};
pub use error::{Classify, DecompressError, ErrorKind};
pub use limits::{
    INITIAL_BUFFER_SIZE, Limits, LimitsError, MAX_BUFFER_SIZE, MAX_COMPRESSED_INPUT, MAX_RATIO,
};
pub use message::{BoundedMessage, MAX_MESSAGE_LEN};
pub use result_state::{Outcome, ResultSlot};
