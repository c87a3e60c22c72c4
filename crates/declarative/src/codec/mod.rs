//! Codecs for the dynamic value model.
//!
//! Two boundaries, two formats:
//! - [`wire`]: the host protocol, which carries `Unknown` values
//! - [`remote`]: the remote object API's JSON, which must never see them

pub mod remote;
pub mod wire;

pub use remote::{from_remote_json, project_remote, to_remote_json, value_to_json};
pub use wire::{decode_state, decode_wire, encode_state, encode_wire};
