pub mod race;

pub use race::{UpstreamRace, UpstreamRaceConfig};
