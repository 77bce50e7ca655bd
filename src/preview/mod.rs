// Preview side of the pipeline: latest-frame buffer and display encoding.

pub mod buffer;
pub mod compress;
