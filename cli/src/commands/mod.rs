//! CLI command implementations.

mod decode;
mod generate;
mod profile;

pub use decode::decode;
pub use generate::generate;
pub use profile::{resolve_profile, show_profile};
