//! rule evaluator
//!
//! decides whether an element occurrence must be hidden for the current
//! request. every rule kind maps to one pure function over the attributes
//! and the request context; the kind is resolved through `RULES`.

use std::collections::HashMap;
use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};
use log::debug;

use super::params::{decode_url_params, ParamCondition};
use super::time::{on_day, parse_clock, parse_date, parse_day_list, weekday_number};
use super::types::{RuleSet, ShowFor, User, SHOWFOR};
use crate::device::{DeviceClass, DeviceKind, PRECEDENCE};

fn whole_seconds(now: NaiveDateTime) -> NaiveDateTime {
    now.with_nanosecond(0).unwrap_or(now)
}

/// request state a rule is evaluated against
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// authenticated user, `None` for anonymous requests
    pub user: Option<User>,
    /// query string parameters of the current request
    pub query: HashMap<String, String>,
    /// host wall-clock time
    pub now: NaiveDateTime,
    /// classification of the requesting device
    pub device: DeviceClass,
}

impl EvalContext {
    /// anonymous desktop request at the given time with no query parameters
    ///
    /// `now` is truncated to whole seconds, the resolution of rule bounds
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            user: None,
            query: HashMap::new(),
            now: whole_seconds(now),
            device: DeviceClass::DESKTOP,
        }
    }

    /// anonymous desktop request at the current local time
    pub fn local() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// set the authenticated user
    pub fn with_user(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }

    /// set the query parameters
    pub fn with_query<I, K, V>(mut self, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query = query
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// set the device classification
    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = device;
        self
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// current user id as the host reports it (0 when anonymous)
    pub fn user_id(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.id)
            .unwrap_or_default()
            .to_string()
    }
}

/// host predicate invoked by php_function rules; `true` hides the element
pub type Predicate = Box<dyn Fn(&EvalContext) -> bool>;

/// named predicates php_function rules may refer to
#[derive(Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Predicate>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// register (or replace) a predicate under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&EvalContext) -> bool + 'static,
    {
        self.predicates.insert(name.into(), Box::new(predicate));
    }

    /// register a predicate that always returns `value`
    pub fn register_constant(&mut self, name: impl Into<String>, value: bool) {
        self.register(name, move |_| value);
    }

    pub fn resolve(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("predicates", &self.names())
            .finish()
    }
}

/// decision for attributes without a (known) rule kind
pub type FallbackHook = Box<dyn Fn(&RuleSet, &EvalContext) -> bool>;

type RuleFn = fn(&RuleSet, &EvalContext, &PredicateRegistry) -> bool;

/// one evaluator per rule kind
const RULES: [(ShowFor, RuleFn); 11] = [
    (ShowFor::NotLoggedIn, not_logged_in),
    (ShowFor::LoggedIn, logged_in),
    (ShowFor::SelectedUserRoles, selected_user_roles),
    (ShowFor::SelectedUsers, selected_users),
    (ShowFor::DiscardedUsers, discarded_users),
    (ShowFor::SelectedDevices, selected_devices),
    (ShowFor::DateRange, date_range),
    (ShowFor::TimeRange, time_range),
    (ShowFor::DayOfWeek, day_of_week),
    (ShowFor::UrlParameters, url_parameters),
    (ShowFor::PhpFunction, php_function),
];

fn rule_for(kind: ShowFor) -> Option<RuleFn> {
    RULES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, rule)| *rule)
}

/// evaluates show-for rules
///
/// holds the host predicates and the optional fallback hook; evaluation
/// itself never mutates the evaluator, the attributes or the context.
#[derive(Default)]
pub struct Evaluator {
    predicates: PredicateRegistry,
    fallback: Option<FallbackHook>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predicates(mut self, predicates: PredicateRegistry) -> Self {
        self.predicates = predicates;
        self
    }

    /// decide attributes with no or an unknown rule kind (default: show)
    pub fn with_fallback<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RuleSet, &EvalContext) -> bool + 'static,
    {
        self.fallback = Some(Box::new(hook));
        self
    }

    pub fn predicates(&self) -> &PredicateRegistry {
        &self.predicates
    }

    pub fn predicates_mut(&mut self) -> &mut PredicateRegistry {
        &mut self.predicates
    }

    /// `true` when the element must be hidden/removed for this request
    pub fn is_filtered(&self, attrs: &RuleSet, ctx: &EvalContext) -> bool {
        let rule = match attrs.kind() {
            Some(kind) => rule_for(kind),
            None => {
                debug!(
                    "unknown showfor value '{}', using fallback",
                    attrs.get(SHOWFOR).unwrap_or_default()
                );
                None
            }
        };

        match rule {
            Some(rule) => rule(attrs, ctx, &self.predicates),
            None => self.fallback(attrs, ctx),
        }
    }

    fn fallback(&self, attrs: &RuleSet, ctx: &EvalContext) -> bool {
        self.fallback
            .as_ref()
            .map(|hook| hook(attrs, ctx))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("predicates", &self.predicates)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

// ============================================================================
// User Rules
// ============================================================================

fn not_logged_in(_attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    ctx.is_logged_in()
}

fn logged_in(_attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    !ctx.is_logged_in()
}

fn selected_user_roles(attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    let Some(user) = ctx.user.as_ref() else {
        return true;
    };
    let Some(selected) = attrs.list("selected_user_roles") else {
        return true;
    };

    !user
        .roles
        .iter()
        .any(|role| !role.is_empty() && selected.contains(&role.as_str()))
}

fn selected_users(attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    match attrs.list("selected_users") {
        Some(selected) => !selected.contains(&ctx.user_id().as_str()),
        None => true,
    }
}

fn discarded_users(attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    match attrs.list("discarded_users") {
        Some(discarded) => discarded.contains(&ctx.user_id().as_str()),
        None => false,
    }
}

// ============================================================================
// Device Rules
// ============================================================================

fn selected_devices(attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    let Some(selected) = attrs.list("selected_devices") else {
        return true;
    };
    let selected: Vec<DeviceKind> = selected
        .into_iter()
        .filter_map(DeviceKind::parse)
        .collect();

    let shown = PRECEDENCE
        .iter()
        .find(|kind| selected.contains(kind) && kind.includes(&ctx.device));

    shown.is_none()
}

// ============================================================================
// Time Rules
// ============================================================================

fn date_range(attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    let now = whole_seconds(ctx.now);
    let start = attrs
        .non_empty("start_date")
        .and_then(parse_date)
        .unwrap_or(now);
    let end = attrs
        .non_empty("end_date")
        .and_then(parse_date)
        .unwrap_or(now);

    now > end || now < start
}

fn time_range(attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    let now = whole_seconds(ctx.now);
    let today = now.date();

    let start = match attrs.non_empty("start_time") {
        Some(s) => {
            let (hour, minute) = parse_clock(s);
            on_day(today, hour, minute, 0)
        }
        None => on_day(today, 0, 0, 0),
    };
    let Some(start) = start else {
        return true;
    };

    let end = match attrs.non_empty("end_time") {
        Some(s) => {
            let (hour, minute) = parse_clock(s);
            on_day(today, hour, minute, 0).and_then(|end| {
                if end <= start {
                    // overnight window: end falls on the next day
                    on_day(today, hour + 24, minute, 0)
                } else {
                    Some(end)
                }
            })
        }
        None => on_day(today, 23, 59, 59),
    };
    let Some(end) = end else {
        return true;
    };

    now > end || now < start
}

fn day_of_week(attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    let Some(days) = attrs.non_empty("day_of_week") else {
        return true;
    };
    let today = weekday_number(&ctx.now);

    !parse_day_list(days).contains(&today)
}

// ============================================================================
// Request Rules
// ============================================================================

fn url_parameters(attrs: &RuleSet, ctx: &EvalContext, _: &PredicateRegistry) -> bool {
    let condition = attrs
        .get("url_params_condition")
        .map(ParamCondition::parse)
        .unwrap_or_default();

    let Some(payload) = attrs.get("url_params").map(str::trim) else {
        return false;
    };
    if payload.is_empty() {
        return false;
    }

    // entries without a name are ignored in both modes
    let params = decode_url_params(payload);
    let mut named = params.iter().filter(|p| p.name.is_some());

    match condition {
        ParamCondition::All => !named.all(|p| p.matches(&ctx.query)),
        ParamCondition::Any => {
            let shown = named.any(|p| {
                // an empty name on a request without any query string counts as a match
                let blank = p.name.as_deref() == Some("") && ctx.query.is_empty();
                blank || p.matches(&ctx.query)
            });
            !shown
        }
    }
}

fn php_function(attrs: &RuleSet, ctx: &EvalContext, predicates: &PredicateRegistry) -> bool {
    let Some(name) = attrs.get("php_function_name") else {
        return false;
    };

    match predicates.resolve(name) {
        Some(predicate) => predicate(ctx),
        None => {
            debug!("predicate '{}' is not registered", name);
            false
        }
    }
}
