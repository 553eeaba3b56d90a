//! show-for rule evaluation
//!
//! an element occurrence carries a `showfor` attribute selecting one of a
//! fixed set of rule kinds, plus kind-specific parameters:
//! - user rules: not_logged_in, logged_in, selected_user_roles,
//!   selected_users, discarded_users
//! - device rules: selected_devices
//! - time rules: date_range, time_range, day_of_week
//! - request rules: url_parameters
//! - php_function: a named host predicate
//!
//! evaluation answers one question: must the element be hidden?

mod eval;
mod params;
mod time;
mod types;

pub use eval::{EvalContext, Evaluator, FallbackHook, Predicate, PredicateRegistry};
pub use params::{decode_url_params, encode_url_params, ParamCondition, UrlParam};
pub use time::{parse_clock, parse_date, parse_day_list};
pub use types::{RuleSet, ShowFor, User, SHOWFOR};
