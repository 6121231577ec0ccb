use intake_publisher::core::workflow_schema::routing::resolve_routing;
use intake_publisher::core::workflow_schema::store::MemberStep;
use intake_types::{RouteMode, RouteOptionRow, RouteRow, RowId};
use serde_json::json;

fn member(step_id: RowId, name: &str, is_start: bool) -> MemberStep {
    MemberStep {
        step_id,
        name: name.to_string(),
        is_start,
    }
}

fn linear(source: RowId, next: Option<RowId>) -> RouteRow {
    RouteRow {
        workflow_id: 1,
        source_step_id: source,
        mode: RouteMode::Linear,
        field_key: None,
        default_next_step_id: next,
    }
}

fn by_option(source: RowId, field_key: &str, default_next: Option<RowId>) -> RouteRow {
    RouteRow {
        workflow_id: 1,
        source_step_id: source,
        mode: RouteMode::ByOption,
        field_key: Some(field_key.to_string()),
        default_next_step_id: default_next,
    }
}

fn option(source: RowId, value: &str, next: RowId) -> RouteOptionRow {
    RouteOptionRow {
        workflow_id: 1,
        source_step_id: source,
        option_value: value.to_string(),
        next_step_id: next,
    }
}

#[test]
fn breadth_first_order_from_flagged_start() {
    let members = vec![
        member(1, "Intro", false),
        member(2, "Eligibility", true),
        member(3, "Details", false),
        member(4, "Done", false),
    ];
    let routes = vec![
        by_option(2, "eligible", Some(4)),
        linear(3, Some(1)),
        linear(1, Some(4)),
    ];
    let options = vec![option(2, "yes", 3), option(2, "no", 4)];

    let plan = resolve_routing(&members, &routes, &options);
    assert_eq!(plan.order(), &[2, 3, 4, 1]);
    assert_eq!(plan.reachable(), &[2, 3, 4, 1]);
    assert!(plan.unreachable().is_empty());
}

#[test]
fn every_member_appears_once_even_when_unreachable() {
    let members = vec![
        member(1, "Start", true),
        member(2, "Island", false),
        member(3, "End", false),
    ];
    let routes = vec![linear(1, Some(3)), linear(2, Some(3))];

    let plan = resolve_routing(&members, &routes, &[]);
    assert_eq!(plan.order(), &[1, 3, 2]);
    assert_eq!(plan.unreachable(), &[2]);
    assert_eq!(plan.slug(2), Some("island"));
}

#[test]
fn start_defaults_to_first_member() {
    let members = vec![member(7, "First", false), member(8, "Second", false)];
    let plan = resolve_routing(&members, &[linear(7, Some(8))], &[]);
    assert_eq!(plan.order(), &[7, 8]);
}

#[test]
fn cycles_terminate() {
    let members = vec![member(1, "A", true), member(2, "B", false)];
    let routes = vec![linear(1, Some(2)), linear(2, Some(1))];
    let plan = resolve_routing(&members, &routes, &[]);
    assert_eq!(plan.order(), &[1, 2]);
    assert_eq!(plan.resolve(2, None).next_step_id.as_deref(), Some("a"));
}

#[test]
fn edges_to_non_members_are_dropped_and_recorded() {
    let members = vec![member(1, "Start", true), member(2, "Next", false)];
    let routes = vec![by_option(1, "pick", Some(99))];
    let options = vec![option(1, "a", 2), option(1, "b", 42)];

    let plan = resolve_routing(&members, &routes, &options);
    let dropped: Vec<(RowId, Option<&str>)> = plan
        .dropped_edges()
        .iter()
        .map(|edge| (edge.target_step_id, edge.option_value.as_deref()))
        .collect();
    assert_eq!(dropped, vec![(42, Some("b")), (99, None)]);

    let resolved = plan.resolve(1, Some("pick-key"));
    let branching = serde_json::to_value(resolved.branching).unwrap();
    assert_eq!(
        branching,
        json!([{"condition": {"==": [{"var": "pick-key"}, "a"]}, "nextStepId": "next"}])
    );
    assert!(resolved.default_next_step_id.is_none());
}

#[test]
fn branch_condition_falls_back_to_raw_field_key() {
    let members = vec![member(1, "Start", true), member(2, "Next", false)];
    let plan = resolve_routing(&members, &[by_option(1, "raw_key", None)], &[option(1, "1", 2)]);
    let resolved = plan.resolve(1, None);
    let rules = resolved.branching.unwrap();
    assert_eq!(rules[0].condition, json!({"==": [{"var": "raw_key"}, "1"]}));
    assert!(resolved.next_step_id.is_none());
}

#[test]
fn step_slugs_are_unique_across_the_run() {
    let members = vec![
        member(1, "Contact", true),
        member(2, "Contact", false),
        member(3, "", false),
    ];
    let plan = resolve_routing(&members, &[linear(1, Some(2))], &[]);
    assert_eq!(plan.slug(1), Some("contact"));
    assert_eq!(plan.slug(2), Some("contact-2"));
    assert_eq!(plan.slug(3), Some("step"));
}

#[test]
fn empty_workflow_has_empty_order() {
    let plan = resolve_routing(&[], &[], &[]);
    assert!(plan.order().is_empty());
}
