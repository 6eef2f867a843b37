//! Studio Generation - image reference adapters
//!
//! Turn creation inputs into resolvable image references:
//! - `PollinationsSynthesizer`: prompt → generated image URL
//! - `ImgbbHost`: uploaded bytes → hosted image URL
//! - `EphemeralHost`: uploaded bytes → local placeholder reference

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod host;
pub mod synth;

pub use host::{build_host, EphemeralHost, ImgbbHost, EPHEMERAL_PREFIX};
pub use synth::PollinationsSynthesizer;
