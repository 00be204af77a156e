//! System prompts per query tab.
//!
//! Each [`Tab`] has a template with a `{tools}` placeholder that receives the
//! registry's tool list, one `name: description` entry per tool.
//!
//! # Example
//!
//! ```rust,ignore
//! use medassist_agent::prompt::{system_prompt, Tab};
//!
//! let prompt = system_prompt(Tab::from_tag("alternatives"), &registry);
//! ```

mod tab;

pub use tab::Tab;

use crate::tool::ToolRegistry;

const TOOLS_PLACEHOLDER: &str = "{tools}";

const ALTERNATIVES_TEMPLATE: &str = "\
You are a medical assistant specialized in finding alternative medications.
Your goal is to help users find suitable alternatives to their current medications.

When suggesting alternatives, always:
1. Clearly indicate therapeutic equivalents
2. Mention potential differences in side effects
3. Note any cost differences when available
4. Structure your response in an organized, easy-to-read format
5. Highlight important considerations for switching medications

Available tools:
{tools}

Format your response as a table or structured list for easy readability.
";

const GENERIC_MEDICINES_TEMPLATE: &str = "\
You are a medical assistant specialized in providing information about generic medicine options.
Your goal is to help users understand generic alternatives to brand-name medications.

When providing information about generic medicines, always:
1. Explain the bioequivalence with brand-name versions
2. Highlight any differences in inactive ingredients
3. Discuss cost savings
4. Address common concerns about generics
5. Structure your response in a clear, tabular format when possible

Available tools:
{tools}

Present pricing information and comparisons in an easy-to-understand table format.
";

const MEDICINE_FINDER_TEMPLATE: &str = "\
You are a medical assistant specialized in helping users find specific medications.
Your goal is to help users locate medications they're looking for and provide relevant information.

When helping users find medications, always:
1. Provide comprehensive information about the medication
2. List common uses, dosages, and formulations
3. Note any availability issues or alternatives if the medication is hard to find
4. Structure your response in a clear, organized format
5. Include any relevant warnings or special considerations

Available tools:
{tools}

Present medication information in a structured format with clear headings.
";

/// Raw template for a tab, placeholder included.
pub fn template(tab: Tab) -> &'static str {
    match tab {
        Tab::Alternatives => ALTERNATIVES_TEMPLATE,
        Tab::GenericMedicines => GENERIC_MEDICINES_TEMPLATE,
        Tab::MedicineFinder => MEDICINE_FINDER_TEMPLATE,
    }
}

/// Tool list as it appears in the prompt.
///
/// Entries are `name: description` sorted by name and joined with `"\n- "`.
/// A tool without a description renders as its bare name.
pub fn describe_tools(registry: &ToolRegistry) -> String {
    registry
        .descriptors()
        .into_iter()
        .map(|d| match d.description() {
            "" => d.name().to_string(),
            description => format!("{}: {}", d.name(), description),
        })
        .collect::<Vec<_>>()
        .join("\n- ")
}

/// The system message for `tab` with the registry's tools filled in.
pub fn system_prompt(tab: Tab, registry: &ToolRegistry) -> String {
    template(tab).replace(TOOLS_PLACEHOLDER, &describe_tools(registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingInvoker;
    use crate::tool::{ToolDescriptor, ToolSchema};
    use serde_json::json;
    use std::sync::Arc;

    fn registry(tools: &[(&str, Option<&str>)]) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for (name, description) in tools {
            registry.register(ToolDescriptor::new(
                Arc::new(RecordingInvoker::ok("")),
                ToolSchema::function(*name, description.map(str::to_string), json!({})),
            ));
        }
        registry
    }

    #[test]
    fn test_every_template_has_placeholder() {
        for tab in Tab::ALL {
            assert_eq!(template(tab).matches(TOOLS_PLACEHOLDER).count(), 1, "{tab}");
        }
    }

    #[test]
    fn test_describe_tools_joins_sorted_entries() {
        let registry = registry(&[
            ("search_generics", Some("Find generics")),
            ("lookup_price", Some("Look up a price")),
        ]);
        assert_eq!(
            describe_tools(&registry),
            "lookup_price: Look up a price\n- search_generics: Find generics"
        );
    }

    #[test]
    fn test_missing_description_renders_name() {
        let registry = registry(&[("ping", None)]);
        assert_eq!(describe_tools(&registry), "ping");
    }

    #[test]
    fn test_empty_registry() {
        let prompt = system_prompt(Tab::MedicineFinder, &ToolRegistry::new());
        assert!(prompt.contains("Available tools:\n\n"));
        assert!(!prompt.contains(TOOLS_PLACEHOLDER));
    }

    #[test]
    fn test_system_prompt_per_tab() {
        let registry = registry(&[("lookup_price", Some("Look up a price"))]);

        let prompt = system_prompt(Tab::Alternatives, &registry);
        assert!(prompt.starts_with("You are a medical assistant specialized in finding alternative"));
        assert!(prompt.contains("Available tools:\nlookup_price: Look up a price\n"));

        let prompt = system_prompt(Tab::GenericMedicines, &registry);
        assert!(prompt.contains("bioequivalence"));

        let prompt = system_prompt(Tab::from_tag("unknown"), &registry);
        assert!(prompt.contains("find specific medications"));
    }
}
