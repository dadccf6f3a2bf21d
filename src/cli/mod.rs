pub mod autopilot;
pub mod commands;
pub mod render;
