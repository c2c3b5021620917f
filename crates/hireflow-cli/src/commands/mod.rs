pub mod board;
pub mod config;
pub mod run;
pub mod stage;
pub mod timeline;
pub mod utils;
