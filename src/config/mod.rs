pub mod game;
pub mod layout;
