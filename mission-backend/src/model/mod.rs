pub mod launches;
pub mod planets;
