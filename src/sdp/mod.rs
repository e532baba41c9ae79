//! Session description model, parser and generator.

mod data;
pub use data::{Data, Description, Role, SdpType};

mod media;
pub use media::{normalize_format, Direction, Media, Pt, RtpMap};

mod parser;
pub(crate) use parser::parse_candidate;

mod reader;
mod ser;
mod writer;
