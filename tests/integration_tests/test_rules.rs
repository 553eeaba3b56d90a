// end-to-end rule behavior through the library api

use chrono::NaiveDate;
use showfor::conditions::{encode_url_params, EvalContext, Evaluator, RuleSet, UrlParam, User};
use showfor::config::ElementSettings;
use showfor::content::{scan_and_strip, strip_advanced_elements, strip_post, ContentStore, MemoryContentStore};
use showfor::shortcode::{find_all, parse_attributes, remove_all};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> EvalContext {
    EvalContext::new(
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap(),
    )
}

fn filtered(attrs: &str, ctx: &EvalContext) -> bool {
    Evaluator::new().is_filtered(&parse_attributes(attrs), ctx)
}

#[test]
fn test_unset_rule_never_filters() {
    let contexts = [
        at(2024, 1, 1, 0, 0),
        at(2024, 1, 1, 0, 0).with_user(Some(User::new(1).with_roles(["admin"]))),
        at(2024, 1, 1, 0, 0).with_query([("x", "1")]),
    ];
    for ctx in &contexts {
        assert!(!filtered("", ctx));
        assert!(!filtered(r#"showfor="""#, ctx));
    }
}

#[test]
fn test_login_rules_are_complements() {
    let anonymous = at(2024, 1, 1, 0, 0);
    let member = anonymous.clone().with_user(Some(User::new(5)));

    for ctx in [&anonymous, &member] {
        assert_ne!(
            filtered(r#"showfor="logged_in""#, ctx),
            filtered(r#"showfor="not_logged_in""#, ctx)
        );
    }
}

#[test]
fn test_time_range_overnight_window() {
    let attrs = r#"showfor="time_range" start_time="22:00" end_time="02:00""#;
    assert!(!filtered(attrs, &at(2024, 5, 1, 23, 30)));
    assert!(filtered(attrs, &at(2024, 5, 1, 10, 0)));
}

#[test]
fn test_day_of_week_list() {
    // 2024-03-06 is a wednesday (3)
    let attrs = r#"showfor="day_of_week" day_of_week="1, 3, 5""#;
    assert!(!filtered(attrs, &at(2024, 3, 6, 9, 0)));
    assert!(filtered(attrs, &at(2024, 3, 7, 9, 0)));
}

#[test]
fn test_url_parameters_all_and_any() {
    let payload = encode_url_params(&[UrlParam::new("x", "1"), UrlParam::new("y", "2")]);
    let all = RuleSet::new()
        .with("showfor", "url_parameters")
        .with("url_params", payload.clone());
    let any = all.clone().with("url_params_condition", "or");
    let evaluator = Evaluator::new();

    let one = at(2024, 1, 1, 0, 0).with_query([("x", "1")]);
    let both = at(2024, 1, 1, 0, 0).with_query([("x", " 1 "), ("y", "2")]);

    assert!(evaluator.is_filtered(&all, &one));
    assert!(!evaluator.is_filtered(&all, &both));
    assert!(!evaluator.is_filtered(&any, &one));
}

#[test]
fn test_scanner_escaped_literal_survives_removal() {
    let text = r#"[tag a="1"][/tag] [[tag]]"#;
    let found = find_all("tag", text);
    assert_eq!(found.len(), 2);

    let live: Vec<_> = found.into_iter().filter(|o| !o.is_escaped()).collect();
    assert_eq!(live.len(), 1);
    assert_eq!(remove_all(text, &live), " [[tag]]");
}

#[test]
fn test_strip_pass_is_idempotent() {
    let mut settings = ElementSettings::initialize(["vc_row", "vc_btn"]);
    settings.set_advanced("vc_row", true);
    settings.set_advanced("vc_btn", true);

    let text = concat!(
        r#"[vc_row showfor="date_range" end_date="2020/01/01"]old[/vc_row]"#,
        r#"[vc_btn showfor="logged_in" /]"#,
        r#"[vc_row]always[/vc_row]"#,
    );
    let evaluator = Evaluator::new();
    let ctx = at(2024, 1, 1, 0, 0);

    let once = strip_advanced_elements(text, &settings, &evaluator, &ctx);
    assert_eq!(once, "[vc_row]always[/vc_row]");
    assert_eq!(strip_advanced_elements(&once, &settings, &evaluator, &ctx), once);
    assert_eq!(scan_and_strip("vc_row", &once, &evaluator, &ctx), once);
}

#[test]
fn test_strip_post_through_store() {
    let mut settings = ElementSettings::default();
    settings.set_advanced("vc_row", true);

    let mut store = MemoryContentStore::new().with_post(
        "42",
        r#"a[vc_row showfor="selected_users" selected_users="7, 8"]b[/vc_row]c"#,
    );
    let evaluator = Evaluator::new();

    let member = at(2024, 1, 1, 0, 0).with_user(Some(User::new(8)));
    assert!(!strip_post(&mut store, "42", &settings, &evaluator, &member).unwrap());

    let stranger = at(2024, 1, 1, 0, 0).with_user(Some(User::new(9)));
    assert!(strip_post(&mut store, "42", &settings, &evaluator, &stranger).unwrap());
    assert_eq!(store.raw_content("42").unwrap(), "ac");
}

#[test]
fn test_custom_predicate_sees_context() {
    let mut evaluator = Evaluator::new();
    evaluator
        .predicates_mut()
        .register("hide_for_admins", |ctx: &EvalContext| {
            ctx.user
                .as_ref()
                .is_some_and(|u| u.roles.iter().any(|r| r == "administrator"))
        });

    let attrs = parse_attributes(r#"showfor="php_function" php_function_name="hide_for_admins""#);
    let admin = at(2024, 1, 1, 0, 0).with_user(Some(User::new(1).with_roles(["administrator"])));

    assert!(evaluator.is_filtered(&attrs, &admin));
    assert!(!evaluator.is_filtered(&attrs, &at(2024, 1, 1, 0, 0)));

    let unknown = parse_attributes(r#"showfor="php_function" php_function_name="missing""#);
    assert!(!evaluator.is_filtered(&unknown, &admin));
}

#[test]
fn test_fallback_hook_for_unknown_kinds() {
    let evaluator = Evaluator::new().with_fallback(|attrs: &RuleSet, _: &EvalContext| {
        attrs.get("showfor") == Some("beta_testers")
    });
    let ctx = at(2024, 1, 1, 0, 0);

    assert!(evaluator.is_filtered(&parse_attributes(r#"showfor="beta_testers""#), &ctx));
    assert!(!evaluator.is_filtered(&parse_attributes(r#"showfor="other""#), &ctx));
}
