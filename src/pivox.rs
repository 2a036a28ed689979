//! The Pivox map format: a JSON metadata block followed by raw data blocks,
//! with the JSON `areas` describing how to fill the block grid from them.

pub mod area;
pub mod container;
pub mod map;

pub use area::{Area, AreaEntry, AreaKind};
pub use container::{BlockDefinition, Metadata, PivoxContainer};
pub use map::{default_map, PivoxMap};

/// Block id meaning "no block".
pub const AIR: u16 = 0;
