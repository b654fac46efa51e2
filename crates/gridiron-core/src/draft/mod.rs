pub mod pick;
pub mod player;
pub mod roster;
pub mod runner;
pub mod state;
