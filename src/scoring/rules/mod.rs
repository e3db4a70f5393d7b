mod domain;
mod kind;
mod lexical;
mod naming;
mod penalty;

use super::{Rule, RuleGroup};

macro_rules! rule {
    ($group:ident, $module:ident :: $name:ident) => {
        Rule {
            name: stringify!($name),
            group: RuleGroup::$group,
            eval: $module::$name,
        }
    };
}

/// Every scoring rule, in evaluation order.
pub static RULES: &[Rule] = &[
    rule!(Kind, kind::strict_kind),
    rule!(Kind, kind::receiver_structure),
    rule!(Kind, kind::kind_blockers),
    rule!(Kind, kind::error_section_conflict),
    rule!(Kind, kind::kind_agreement),
    rule!(Kind, kind::current_section),
    rule!(Kind, kind::function_type_interaction),
    rule!(Kind, kind::exact_type_name),
    rule!(Kind, kind::implementation_mapping),
    rule!(Domain, domain::domain_affinity),
    rule!(Domain, domain::comment_keywords),
    rule!(Domain, domain::type_name_suffix),
    rule!(Domain, domain::domain_type_subsection),
    rule!(Domain, domain::comment_domain),
    rule!(Lexical, lexical::heading_match),
    rule!(Lexical, lexical::camelcase_overlap),
    rule!(Lexical, lexical::parent_heading),
    rule!(Lexical, lexical::prose_keywords),
    rule!(Lexical, lexical::content_keywords),
    rule!(Lexical, lexical::subsection_keywords),
    rule!(Lexical, lexical::file_patterns),
    rule!(Naming, naming::constructor),
    rule!(Naming, naming::method_operation),
    rule!(Naming, naming::getter_transformation),
    rule!(Naming, naming::method_name_preferences),
    rule!(Naming, naming::error_context_type),
    rule!(Naming, naming::hash_optional_types),
    rule!(Naming, naming::metadata_tag_helpers),
    rule!(Penalty, penalty::type_operation),
    rule!(Penalty, penalty::misplaced_error_type),
    rule!(Penalty, penalty::error_domain),
    rule!(Penalty, penalty::kind_section_map),
];
