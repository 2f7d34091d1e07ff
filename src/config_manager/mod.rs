pub mod main;
pub mod scoring;
pub mod system;
pub mod translator;
pub mod utils;

pub use main::Config;
