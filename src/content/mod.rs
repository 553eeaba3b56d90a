//! applies show-for rules to content
//!
//! two entry points: the strip pass rewrites raw content and drops hidden
//! occurrences of advanced elements; the output filter blanks one element's
//! rendered output at render time.

mod store;

pub use store::{ContentStore, FsContentStore, MemoryContentStore, StoreError};

use log::debug;

use crate::conditions::{EvalContext, Evaluator, RuleSet};
use crate::config::{ElementSettings, EnabledState};
use crate::shortcode::{find_all, remove_all};

/// remove every live occurrence of `element` whose rules hide it
///
/// escaped occurrences (`[[element]]`) are literal text and always kept
pub fn scan_and_strip(
    element: &str,
    text: &str,
    evaluator: &Evaluator,
    ctx: &EvalContext,
) -> String {
    let hidden: Vec<_> = find_all(element, text)
        .into_iter()
        .filter(|occurrence| !occurrence.is_escaped())
        .filter(|occurrence| evaluator.is_filtered(&occurrence.attributes(), ctx))
        .collect();

    if hidden.is_empty() {
        return text.to_string();
    }

    debug!("stripping {} occurrence(s) of [{}]", hidden.len(), element);
    remove_all(text, &hidden)
}

/// run `scan_and_strip` for every element with the advanced flag on
pub fn strip_advanced_elements(
    text: &str,
    settings: &ElementSettings,
    evaluator: &Evaluator,
    ctx: &EvalContext,
) -> String {
    settings
        .advanced_elements()
        .fold(text.to_string(), |content, element| {
            scan_and_strip(element, &content, evaluator, ctx)
        })
}

/// rendered output of one element, or "" when its rules hide it
///
/// only elements whose state is `Enabled` are checked
pub fn filter_output<'a>(
    element: &str,
    output: &'a str,
    attrs: &RuleSet,
    settings: &ElementSettings,
    evaluator: &Evaluator,
    ctx: &EvalContext,
) -> &'a str {
    if settings.enabled_state(element) != EnabledState::Enabled {
        return output;
    }

    if evaluator.is_filtered(attrs, ctx) {
        debug!("hiding output of [{}]", element);
        ""
    } else {
        output
    }
}

/// strip one stored post; returns whether it was rewritten
pub fn strip_post<S: ContentStore + ?Sized>(
    store: &mut S,
    post: &str,
    settings: &ElementSettings,
    evaluator: &Evaluator,
    ctx: &EvalContext,
) -> Result<bool, StoreError> {
    let raw = store.raw_content(post)?;
    let stripped = strip_advanced_elements(&raw, settings, evaluator, ctx);

    if stripped == raw {
        return Ok(false);
    }

    store.write_raw_content(post, &stripped)?;
    debug!("rewrote post {}", post);
    Ok(true)
}
