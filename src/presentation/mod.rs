pub mod cli;
pub mod exit;
pub mod progress;
pub mod renderer;
