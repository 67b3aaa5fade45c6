//! Engine data structures: images, textures and scene graphs.
//!
//! - `image` contains the decoded CPU-side image record and its mip layout
//! - `texture` contains the decode-once texture asset and its load state machine
//! - `scene_graph` enables hierarchical scene organization with typed payloads

pub mod image;
pub mod scene_graph;
pub mod texture;
