//! HTML parsers
//!
//! Contains the episode page parser and the markup lookups the
//! provider extractors share.

pub mod episode;
pub mod script;

pub use episode::parse_provider_map;
pub use script::{find_script_literal, first_iframe_src, json_script_text};
