//! Grouping and rewording of breaking changes for the report.
//!
//! Each known change type has a title and a rewrite rule that turns the
//! diff's plain-text description into Markdown with code spans. Changes are
//! grouped by type in first-seen order; within a group they keep the order the
//! diff emitted them in.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::schema::BreakingChange;

/// Title used for change types without a rule.
pub const FALLBACK_TITLE: &str = "Other breaking changes";

/// How one change type is presented.
#[derive(Debug)]
pub struct Rule {
    pub change_type: &'static str,
    pub title: &'static str,
    pattern: Regex,
    template: &'static str,
}

impl Rule {
    fn new(
        change_type: &'static str,
        title: &'static str,
        pattern: &str,
        template: &'static str,
    ) -> Self {
        Self {
            change_type,
            title,
            // The patterns are literals covered by the tests below.
            pattern: Regex::new(pattern).expect("classifier pattern is valid"),
            template,
        }
    }

    /// Rewrites a description. Descriptions the pattern does not match are
    /// returned unchanged.
    pub fn rewrite(&self, description: &str) -> String {
        self.pattern.replace(description, self.template).into_owned()
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "TYPE_REMOVED",
            "Type removed",
            r"^(\S+) was removed\.$",
            "`${1}` was removed",
        ),
        Rule::new(
            "TYPE_CHANGED_KIND",
            "Type kind changed",
            r"^(\S+) changed from (an? \w+ type) to (an? \w+ type)\.$",
            "`${1}` changed from ${2} to ${3}",
        ),
        Rule::new(
            "TYPE_REMOVED_FROM_UNION",
            "Union member removed",
            r"^(\S+) was removed from union type (\S+)\.$",
            "`${1}` was removed from union `${2}`",
        ),
        Rule::new(
            "VALUE_REMOVED_FROM_ENUM",
            "Enum value removed",
            r"^(\S+) was removed from enum type (\S+)\.$",
            "`${1}` was removed from enum `${2}`",
        ),
        Rule::new(
            "REQUIRED_INPUT_FIELD_ADDED",
            "Required input field added",
            r"^A required field (\S+) on input type (\S+) was added\.$",
            "Required field `${1}` was added to input `${2}`",
        ),
        Rule::new(
            "IMPLEMENTED_INTERFACE_REMOVED",
            "Interface implementation removed",
            r"^(\S+) no longer implements interface (\S+)\.$",
            "`${1}` no longer implements `${2}`",
        ),
        Rule::new(
            "FIELD_REMOVED",
            "Field removed",
            r"^(\S+)\.(\S+) was removed\.$",
            "`${1}.${2}` was removed",
        ),
        Rule::new(
            "FIELD_CHANGED_KIND",
            "Field type changed",
            r"^(\S+)\.(\S+) changed type from (\S+) to (\S+)\.$",
            "`${1}.${2}` changed type from `${3}` to `${4}`",
        ),
        Rule::new(
            "REQUIRED_ARG_ADDED",
            "Required argument added",
            r"^A required arg (\S+) on (\S+)\.(\S+) was added\.$",
            "Required argument `${1}` was added to `${2}.${3}`",
        ),
        Rule::new(
            "ARG_REMOVED",
            "Argument removed",
            r"^(\S+)\.(\S+) arg (\S+) was removed\.$",
            "Argument `${3}` was removed from `${1}.${2}`",
        ),
        Rule::new(
            "ARG_CHANGED_KIND",
            "Argument type changed",
            r"^(\S+)\.(\S+) arg (\S+) has changed type from (\S+) to (\S+)\.$",
            "Argument `${3}` on `${1}.${2}` changed type from `${4}` to `${5}`",
        ),
        Rule::new(
            "DIRECTIVE_REMOVED",
            "Directive removed",
            r"^(\S+) was removed\.$",
            "`@${1}` was removed",
        ),
        Rule::new(
            "DIRECTIVE_ARG_REMOVED",
            "Directive argument removed",
            r"^(\S+) was removed from (\S+)\.$",
            "Argument `${1}` was removed from `@${2}`",
        ),
        Rule::new(
            "REQUIRED_DIRECTIVE_ARG_ADDED",
            "Required directive argument added",
            r"^A required arg (\S+) on directive (\S+) was added\.$",
            "Required argument `${1}` was added to `@${2}`",
        ),
        Rule::new(
            "DIRECTIVE_LOCATION_REMOVED",
            "Directive location removed",
            r"^(\S+) was removed from (\S+)\.$",
            "Location `${1}` was removed from `@${2}`",
        ),
    ]
});

/// Looks up the presentation rule for a change type.
pub fn rule_for(change_type: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.change_type == change_type)
}

/// Renders changes as Markdown lines: a bold title per group followed by one
/// bullet per change.
///
/// Changes of unknown types are collected under [`FALLBACK_TITLE`] with their
/// description unchanged.
pub fn render(changes: &[BreakingChange]) -> Vec<String> {
    // Keyed by change type; unknown types share the `None` group.
    let mut groups: Vec<(Option<&'static Rule>, Vec<String>)> = Vec::new();

    for change in changes {
        let rule = rule_for(&change.change_type);
        let line = match rule {
            Some(rule) => rule.rewrite(&change.description),
            None => {
                warn!(
                    change_type = %change.change_type,
                    "No presentation rule for breaking change type"
                );
                change.description.clone()
            }
        };

        let key = rule.map(|r| r.change_type);
        match groups.iter_mut().find(|(r, _)| r.map(|r| r.change_type) == key) {
            Some((_, lines)) => lines.push(line),
            None => groups.push((rule, vec![line])),
        }
    }

    let mut lines = Vec::new();
    for (rule, group) in groups {
        let title = rule.map_or(FALLBACK_TITLE, |r| r.title);
        lines.push(format!("**{}**", title));
        lines.extend(group.into_iter().map(|line| format!("- {}", line)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(change_type: &str, description: &str) -> BreakingChange {
        BreakingChange {
            change_type: change_type.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn every_rule_compiles() {
        assert_eq!(RULES.len(), 15);
    }

    #[test]
    fn rewrites_field_type_change() {
        let lines = render(&[change(
            "FIELD_CHANGED_KIND",
            "Query.a changed type from String to Int.",
        )]);
        assert_eq!(
            lines,
            [
                "**Field type changed**",
                "- `Query.a` changed type from `String` to `Int`"
            ]
        );
    }

    #[test]
    fn rewrites_each_known_description() {
        let cases = [
            ("TYPE_REMOVED", "User was removed.", "`User` was removed"),
            (
                "TYPE_CHANGED_KIND",
                "Shape changed from an Object type to a Union type.",
                "`Shape` changed from an Object type to a Union type",
            ),
            (
                "TYPE_REMOVED_FROM_UNION",
                "B was removed from union type U.",
                "`B` was removed from union `U`",
            ),
            (
                "VALUE_REMOVED_FROM_ENUM",
                "Y was removed from enum type E.",
                "`Y` was removed from enum `E`",
            ),
            (
                "REQUIRED_INPUT_FIELD_ADDED",
                "A required field d on input type In was added.",
                "Required field `d` was added to input `In`",
            ),
            (
                "IMPLEMENTED_INTERFACE_REMOVED",
                "A no longer implements interface Node.",
                "`A` no longer implements `Node`",
            ),
            ("FIELD_REMOVED", "Query.a was removed.", "`Query.a` was removed"),
            (
                "REQUIRED_ARG_ADDED",
                "A required arg d on Query.f was added.",
                "Required argument `d` was added to `Query.f`",
            ),
            (
                "ARG_REMOVED",
                "Query.f arg a was removed.",
                "Argument `a` was removed from `Query.f`",
            ),
            (
                "ARG_CHANGED_KIND",
                "Query.f arg b has changed type from [String]! to Int.",
                "Argument `b` on `Query.f` changed type from `[String]!` to `Int`",
            ),
            ("DIRECTIVE_REMOVED", "auth was removed.", "`@auth` was removed"),
            (
                "DIRECTIVE_ARG_REMOVED",
                "role was removed from auth.",
                "Argument `role` was removed from `@auth`",
            ),
            (
                "REQUIRED_DIRECTIVE_ARG_ADDED",
                "A required arg z on directive b was added.",
                "Required argument `z` was added to `@b`",
            ),
            (
                "DIRECTIVE_LOCATION_REMOVED",
                "FIELD was removed from b.",
                "Location `FIELD` was removed from `@b`",
            ),
        ];

        for (change_type, description, expected) in cases {
            let rule = rule_for(change_type).unwrap();
            assert_eq!(rule.rewrite(description), expected, "{}", change_type);
        }
    }

    #[test]
    fn groups_in_first_seen_order() {
        let lines = render(&[
            change("FIELD_REMOVED", "Query.a was removed."),
            change("TYPE_REMOVED", "User was removed."),
            change("FIELD_REMOVED", "Query.b was removed."),
        ]);
        assert_eq!(
            lines,
            [
                "**Field removed**",
                "- `Query.a` was removed",
                "- `Query.b` was removed",
                "**Type removed**",
                "- `User` was removed",
            ]
        );
    }

    #[test]
    fn unknown_types_use_fallback_section() {
        let lines = render(&[
            change("SOMETHING_NEW", "Something changed."),
            change("FIELD_REMOVED", "Query.a was removed."),
            change("ANOTHER_NEW", "Another thing changed."),
        ]);
        assert_eq!(
            lines,
            [
                "**Other breaking changes**",
                "- Something changed.",
                "- Another thing changed.",
                "**Field removed**",
                "- `Query.a` was removed",
            ]
        );
    }

    #[test]
    fn unmatched_description_is_kept() {
        let lines = render(&[change("FIELD_REMOVED", "worded differently")]);
        assert_eq!(lines[1], "- worded differently");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render(&[]).is_empty());
    }
}
