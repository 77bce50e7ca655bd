// Frame acquisition: capture targets, frame types, and the source/sink seams.

pub mod backend;
pub mod dummy;
pub mod error;
pub mod frame;
pub mod target;
