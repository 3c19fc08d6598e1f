#[macro_use]
extern crate log;
extern crate custom_error;

pub mod models;
pub mod plugins;
pub mod utils;
