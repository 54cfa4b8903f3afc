pub mod backend;
pub mod commands;
pub mod controller;
pub mod enums;
pub mod error;
pub mod playback;
pub mod progress;
pub mod queue;
pub mod state;
pub mod system;
