pub mod artifact;
pub mod config;
pub mod feed;

pub use artifact::*;
pub use config::Config;
pub use feed::*;
