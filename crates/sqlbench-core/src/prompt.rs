use crate::errors::ConfigError;

pub const CONTEXT_PLACEHOLDER: &str = "[context]";
pub const QUESTION_PLACEHOLDER: &str = "[question]";
pub const INSTRUCTIONS_PLACEHOLDER: &str = "{instructions}";

const PREAMBLE: &str = "You are an expert data analyst. Given the database schema below, \
write one SQLite query that answers the user's question.";

/// Ordered from most to least important; an instruction size of `n` keeps the first `n`.
pub const INSTRUCTIONS: &[&str] = &[
    "Return only the SQL query, without explanations.",
    "Use only tables and columns that appear in the schema.",
    "End the query with a semicolon.",
    "Do not invent values; use literals exactly as they appear in the question.",
    "Prefer explicit JOIN ... ON clauses over implicit joins.",
    "Qualify column names with table aliases when more than one table is used.",
    "Use COUNT(*) when counting rows and DISTINCT only when duplicates must be removed.",
    "Use ORDER BY with LIMIT for superlatives such as highest, lowest, first or last.",
    "Use GROUP BY for every non-aggregated column in the SELECT list.",
    "If the question cannot be answered from the schema, reply \"I don't know\".",
];

pub fn numbered_instructions(instruction_size: u32) -> String {
    INSTRUCTIONS
        .iter()
        .take(instruction_size as usize)
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Built-in system prompt for `instruction_size`; sizes past the list are clamped.
pub fn system_prompt(instruction_size: u32) -> String {
    let mut out = String::from(PREAMBLE);
    let rules = numbered_instructions(instruction_size);
    if !rules.is_empty() {
        out.push_str("\n\nInstructions:\n");
        out.push_str(&rules);
    }
    out.push_str("\n\nDatabase schema:\n");
    out.push_str(CONTEXT_PLACEHOLDER);
    out.push_str("\n\nQuestion: ");
    out.push_str(QUESTION_PLACEHOLDER);
    out
}

/// Checks a user-supplied template before any combination starts.
pub fn validate_template(template: &str) -> Result<(), ConfigError> {
    if !template.contains(CONTEXT_PLACEHOLDER) {
        return Err(ConfigError(format!(
            "prompt template must contain {}",
            CONTEXT_PLACEHOLDER
        )));
    }
    Ok(())
}

/// Template for one combination: custom when given, built-in otherwise.
pub fn template_for(custom: Option<&str>, instruction_size: u32) -> String {
    match custom {
        Some(t) => t.replace(INSTRUCTIONS_PLACEHOLDER, &numbered_instructions(instruction_size)),
        None => system_prompt(instruction_size),
    }
}

/// System message for one query. The question travels as the user message,
/// so its slot in the system prompt is blanked.
pub fn render_system(template: &str, context: &str) -> String {
    template
        .replace(CONTEXT_PLACEHOLDER, context)
        .replace(QUESTION_PLACEHOLDER, "")
}
