//! Offline pipeline that turns raw tallies into the static result files.

pub mod baseline;
pub mod csv;
pub mod district_counties;
pub mod dots;
pub mod house;
pub mod presidential;
pub mod rng;

pub use rng::ParkMiller;
