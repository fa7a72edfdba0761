//! Prompt loader: built-in definitions and YAML overrides.

use crate::types::PromptDefinition;
use company_chat_core::{AppError, AppResult};
use std::path::Path;

/// Prompt used for constrained summarization of retrieval context.
pub const SUMMARIZE_PROMPT_ID: &str = "company.summarize";

/// Highest sampling temperature accepted for the summarize prompt.
pub const MAX_SUMMARIZE_TEMPERATURE: f32 = 0.2;

/// Placeholders the summarize prompt must keep: (field, variable).
const SUMMARIZE_PLACEHOLDERS: &[(&str, &str)] = &[
    ("template", "question"),
    ("template", "context"),
    ("system", "noDataReply"),
];

/// Prompt used by the unconstrained `/chat` endpoint.
pub const OPEN_CHAT_PROMPT_ID: &str = "company.open_chat";

const SUMMARIZE_SYSTEM: &str = "당신은 회사 고객 문의에 답하는 상담 도우미입니다.\n\
규칙:\n\
- 반드시 사용자가 제공한 [자료] 안의 내용만 근거로 답하세요.\n\
- 자료에 없는 내용은 추측하거나 외부 지식으로 보충하지 마세요.\n\
- 자료의 표현을 살려 자연스러운 한국어 존댓말로 간결하게 답하세요.\n\
- 자료가 질문에 답하기에 충분하지 않으면 다른 말 없이 정확히 다음 문장만 출력하세요: {{noDataReply}}";

const SUMMARIZE_TEMPLATE: &str = "[질문]\n{{question}}\n\n[자료]\n<<<\n{{context}}\n>>>";

/// Look up a built-in prompt definition by ID.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    match prompt_id {
        SUMMARIZE_PROMPT_ID => Ok(PromptDefinition {
            id: SUMMARIZE_PROMPT_ID.to_string(),
            title: "Constrained company summary".to_string(),
            api_version: "1.0".to_string(),
            system: SUMMARIZE_SYSTEM.to_string(),
            template: SUMMARIZE_TEMPLATE.to_string(),
            required: vec!["question".to_string(), "context".to_string()],
            temperature: 0.0,
            max_tokens: Some(600),
        }),
        OPEN_CHAT_PROMPT_ID => Ok(PromptDefinition {
            id: OPEN_CHAT_PROMPT_ID.to_string(),
            title: "Open chat".to_string(),
            api_version: "1.0".to_string(),
            system: "You are a helpful assistant.".to_string(),
            template: "{{message}}".to_string(),
            required: Vec::new(),
            temperature: 0.3,
            max_tokens: None,
        }),
        _ => Err(AppError::Prompt(format!(
            "Unknown built-in prompt: {}",
            prompt_id
        ))),
    }
}

/// Load a prompt definition from a YAML file.
///
/// # Example
/// ```no_run
/// use company_chat_prompt::load_prompt_file;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt_file(Path::new("prompts/summarize.yml"))?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt_file(path: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            path
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", path, e))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Resolve a prompt: the override file when given, else the built-in.
pub fn load_prompt(override_file: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    let Some(path) = override_file else {
        return builtin_prompt(prompt_id);
    };

    let definition = load_prompt_file(path)?;
    if prompt_id == SUMMARIZE_PROMPT_ID {
        validate_summarize_prompt(&definition)?;
    }
    Ok(definition)
}

/// An override of the summarize prompt must stay constrained: near-zero
/// temperature, question and context in the user message, and the refusal
/// sentence in the system message.
fn validate_summarize_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.temperature > MAX_SUMMARIZE_TEMPERATURE {
        return Err(AppError::Prompt(format!(
            "Summarize prompt temperature {} exceeds {}",
            def.temperature, MAX_SUMMARIZE_TEMPERATURE
        )));
    }

    for (field, variable) in SUMMARIZE_PLACEHOLDERS {
        let text = if *field == "system" { &def.system } else { &def.template };
        if !has_placeholder(text, variable) {
            return Err(AppError::Prompt(format!(
                "Summarize prompt {} must contain {{{{{}}}}}",
                field, variable
            )));
        }
    }

    Ok(())
}

/// Whether `text` references `{{variable}}`, ignoring spaces inside braces.
fn has_placeholder(text: &str, variable: &str) -> bool {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.contains(&format!("{{{{{}}}}}", variable))
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.system.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt system message cannot be empty".to_string(),
        ));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if !(0.0..=2.0).contains(&def.temperature) {
        return Err(AppError::Prompt(format!(
            "Prompt temperature out of range: {}",
            def.temperature
        )));
    }

    Ok(())
}
