//! Voice Canvas - draw on a window with your voice
//!
//! Pitch picks the direction a cursor moves, loudness picks how far it
//! moves and how thick the stroke is.

pub mod app;
pub mod audio;
pub mod canvas;
pub mod cli;
pub mod error;
pub mod logging;
pub mod motion;
pub mod params;
pub mod pitch;
pub mod rendering;
pub mod session;
pub mod visualizer;
