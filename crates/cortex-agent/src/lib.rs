pub mod errors;
pub mod extract;
pub mod inputs;
pub mod models;
pub mod outputs;
pub mod persist;
pub mod providers;
pub mod runner;
