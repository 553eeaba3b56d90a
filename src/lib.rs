// library crate for showfor
// rule evaluation, shortcode scanning and content stripping, plus the cli
// the binary is built on

pub mod cli;
pub mod conditions;
pub mod config;
pub mod content;
pub mod device;
pub mod shortcode;
