pub mod celestial;
pub mod positions;
pub mod weather;
