//! Prompt types for the company chat service.

use serde::{Deserialize, Serialize};

/// A prompt definition, built in or loaded from YAML.
///
/// Both `system` and `template` are Handlebars templates rendered with the
/// same variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// System message template
    pub system: String,

    /// User message template
    pub template: String,

    /// Variables that must be present (and non-blank) when rendering
    #[serde(default)]
    pub required: Vec<String>,

    /// Sampling temperature for this prompt
    #[serde(default)]
    pub temperature: f32,

    /// Optional completion budget
    #[serde(rename = "maxTokens", default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A rendered system/user message pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message
    pub system: String,

    /// User message
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: company.summarize
title: Constrained summary
apiVersion: "1.0"
system: "Answer only from context."
template: "Q: {{question}}"
required: [question]
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "company.summarize");
        assert_eq!(def.required, vec!["question"]);
        assert_eq!(def.temperature, 0.0);
        assert_eq!(def.max_tokens, None);
    }
}
