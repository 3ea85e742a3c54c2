pub mod art;
pub mod config;
pub mod entities;
pub mod error;
pub mod game;
pub mod grid;
pub mod hud;
pub mod movement;
pub mod phase;
pub mod raycast;
pub mod render;
pub mod scheduler;
pub mod sound;
pub mod sprites;
pub mod surface;
