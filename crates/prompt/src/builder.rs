//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use company_chat_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// This function:
/// 1. Checks that every variable listed in `required` is present and non-blank
/// 2. Renders the system and user templates with Handlebars
/// 3. Returns a `BuiltPrompt` ready for LLM execution
///
/// # Example
/// ```no_run
/// use company_chat_prompt::{build_prompt, builtin_prompt, SUMMARIZE_PROMPT_ID};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt(SUMMARIZE_PROMPT_ID)?;
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "환불 정책이 궁금해요".to_string());
/// vars.insert("context".to_string(), "환불은 7일 이내 가능합니다.".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    for name in &definition.required {
        let present = variables
            .get(name)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' requires variable '{}'",
                definition.id, name
            )));
        }
    }

    let system = render_template(&definition.system, &variables)?;
    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt { system, user })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            system: "Reply with {{fallback}} when unsure.".to_string(),
            template: "Question: {{question}}".to_string(),
            required: vec!["question".to_string()],
            temperature: 0.0,
            max_tokens: None,
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("prompt".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{prompt}}", &vars);
        assert_eq!(result.unwrap(), "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "<b>A & B</b> \"quoted\"".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "<b>A & B</b> \"quoted\"");
    }

    #[test]
    fn test_build_prompt_renders_both_messages() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "설치비가 있나요?".to_string());
        vars.insert("fallback".to_string(), "모름".to_string());

        let built = build_prompt(&definition(), vars).unwrap();
        assert_eq!(built.system, "Reply with 모름 when unsure.");
        assert_eq!(built.user, "Question: 설치비가 있나요?");
    }

    #[test]
    fn test_build_prompt_missing_required_variable() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "   ".to_string());

        let result = build_prompt(&definition(), vars);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_render_template_missing_optional_variable() {
        let vars = HashMap::new();
        // Handlebars renders missing variables as empty string
        let result = render_template("Question: {{missing}}", &vars);
        assert_eq!(result.unwrap(), "Question: ");
    }
}
