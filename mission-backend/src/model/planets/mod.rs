///! Habitable planets from the Kepler catalog, used as launch targets

pub mod parser;
pub mod manager;

pub use manager::PlanetManager;
