//! US election results on a braille terminal map, and the offline pipeline
//! that builds the result files it reads.

pub mod braille;
pub mod color;
pub mod config;
pub mod data;
pub mod election;
pub mod error;
pub mod geo;
pub mod map;
pub mod nav;
pub mod panel;
pub mod prep;
