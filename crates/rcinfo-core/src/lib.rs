pub mod config;
pub mod logging;

pub mod bot;
pub mod error;
pub mod http;
pub mod lookup;
pub mod quota;
pub mod regno;
pub mod render;
pub mod shape;
pub mod vehicle;
pub mod web;

#[cfg(test)]
mod testutil;
