//! shortcode tag scanning: locate, inspect and remove tagged regions in raw content

mod attrs;
mod scanner;

pub use attrs::parse_attributes;
pub use scanner::{find_all, first_tag_name, remove_all, Occurrence};

use crate::conditions::RuleSet;

/// attributes of one occurrence
pub fn attributes_of(occurrence: &Occurrence<'_>) -> RuleSet {
    occurrence.attributes()
}
