// Unit tests for the instruction translator

use super::*;
use pretty_assertions::assert_eq;

const BASE: &str = "http://x.com";

#[test]
fn test_navigate_relative_route_joins_base_url() {
    let steps = translate("go to /foo", BASE);
    assert_eq!(
        steps,
        vec![ActionStep::Navigate {
            target: "http://x.com/foo".to_string()
        }]
    );
}

#[test]
fn test_navigate_trailing_slash_on_base_collapses() {
    let steps = translate("navigate to dashboard", "http://x.com/");
    assert_eq!(
        steps,
        vec![ActionStep::Navigate {
            target: "http://x.com/dashboard".to_string()
        }]
    );
}

#[test]
fn test_navigate_absolute_url_passes_through() {
    let steps = translate("go to http://other.com/path", BASE);
    assert_eq!(
        steps,
        vec![ActionStep::Navigate {
            target: "http://other.com/path".to_string()
        }]
    );
}

#[test]
fn test_click_keeps_remainder_verbatim() {
    let steps = translate("click the submit button", BASE);
    assert_eq!(
        steps,
        vec![ActionStep::Click {
            target: "the submit button".to_string()
        }]
    );
}

#[test]
fn test_type_with_double_quoted_value() {
    let steps = translate("type \"hello\" into #search", BASE);
    assert_eq!(
        steps,
        vec![ActionStep::Type {
            target: "#search".to_string(),
            value: "hello".to_string()
        }]
    );
}

#[test]
fn test_type_with_single_quoted_value() {
    let steps = translate("enter 'alice@example.com' into input#email", BASE);
    assert_eq!(
        steps,
        vec![ActionStep::Type {
            target: "input#email".to_string(),
            value: "alice@example.com".to_string()
        }]
    );
}

#[test]
fn test_type_without_into_is_dropped() {
    assert!(translate("type \"hello\" somewhere", BASE).is_empty());
}

#[test]
fn test_type_without_quoted_value_is_dropped() {
    assert!(translate("type hello into #search", BASE).is_empty());
}

#[test]
fn test_wait_concatenates_digits() {
    let steps = translate("wait 3000ms", BASE);
    assert_eq!(steps, vec![ActionStep::Wait { timeout_ms: 3000 }]);

    // Digits are concatenated in order, wherever they appear
    let steps = translate("wait for 1 second and 500", BASE);
    assert_eq!(steps, vec![ActionStep::Wait { timeout_ms: 1500 }]);
}

#[test]
fn test_wait_without_digits_is_dropped() {
    assert!(translate("wait a moment", BASE).is_empty());
}

#[test]
fn test_assert_words_in_fixed_order() {
    let steps = translate("verify #success-banner", BASE);
    assert_eq!(
        steps,
        vec![ActionStep::Assert {
            target: "#success-banner".to_string()
        }]
    );

    // "verify" is tested before "check" even when "check" appears first
    let steps = translate("check then verify .toast", BASE);
    assert_eq!(
        steps,
        vec![ActionStep::Assert {
            target: ".toast".to_string()
        }]
    );
}

#[test]
fn test_unrecognized_line_yields_no_step() {
    assert!(translate("do nothing special", BASE).is_empty());
}

#[test]
fn test_rule_priority_navigation_beats_click() {
    // "go to" wins over the later "click" mention
    let steps = translate("go to /cart and click checkout", BASE);
    assert_eq!(
        steps,
        vec![ActionStep::Navigate {
            target: "http://x.com/cart and click checkout".to_string()
        }]
    );
}

#[test]
fn test_multi_line_instructions_keep_order() {
    let instructions = "\
go to /login

type \"bob\" into #username
click login
wait 250ms
verify .welcome";

    let steps = translate(instructions, BASE);
    assert_eq!(steps.len(), 5);
    assert_eq!(
        steps[0],
        ActionStep::Navigate {
            target: "http://x.com/login".to_string()
        }
    );
    assert_eq!(
        steps[4],
        ActionStep::Assert {
            target: ".welcome".to_string()
        }
    );
}

#[test]
fn test_lines_are_lowercased_before_matching() {
    let steps = translate("Click The Banner", BASE);
    assert_eq!(
        steps,
        vec![ActionStep::Click {
            target: "the banner".to_string()
        }]
    );
}

#[test]
fn test_step_serializes_with_type_tag() {
    let json = serde_json::to_value(ActionStep::Wait { timeout_ms: 100 }).unwrap();
    assert_eq!(json["type"], "wait");
    assert_eq!(json["timeout_ms"], 100);
}
