//! command-proto: the five-primitive robot command language
//!
//! Commands travel to the hubs as a UTF-8 JSON array of command steps, each
//! step an array of `{"cmd": ..., "val": ...}` objects executed together.
//! This crate owns the typed model and the wire codec; it knows nothing
//! about transports or scheduling.

mod types;
pub use types::{Command, CommandSequence, CommandStep, ShootMode, ROTATE_Y_LIMIT_DEG};

mod error;
pub use error::{ProtoError, Result};

mod codec;
pub use codec::{decode_sequence, encode_sequence, encode_step};
