// Draft simulation core: roster slots, player pool, snake draft engine,
// lineup optimizer, strategies, waivers, and season play.

pub mod draft;
pub mod error;
pub mod lineup;
pub mod protocol;
pub mod scoring;
pub mod season;
pub mod store;
pub mod strategy;
pub mod waivers;
