//! Shared types for the marker-scan workspace: the pixel encodings and frame
//! buffer produced at the frame-source boundary, candidate rectangles, and the
//! TOML configuration tree.

pub mod config;
pub mod frame;
pub mod pixel;
pub mod scene;
