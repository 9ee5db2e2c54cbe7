// @module: Text shaping between generation stages

/// Explanation split into presentable steps
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationSteps {
    /// One entry per logical step
    pub steps: Vec<String>,
    /// The full explanation text, trimmed
    pub explanation: String,
}

impl ExplanationSteps {
    /// Build steps from a tutor's free-text answer
    ///
    /// When splitting yields nothing the whole text becomes the single step.
    pub fn from_explanation(text: &str) -> Self {
        let explanation = text.trim().to_string();
        let mut steps = split_into_lines(&explanation);
        if steps.is_empty() && !explanation.is_empty() {
            steps.push(explanation.clone());
        }
        Self { steps, explanation }
    }
}

/// Split text into logical lines
///
/// Existing line breaks win; text without any is split on sentence periods.
/// Blank parts are dropped.
pub fn split_into_lines(text: &str) -> Vec<String> {
    let raw = text.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let parts: Box<dyn Iterator<Item = &str>> = if raw.contains('\n') {
        Box::new(raw.lines())
    } else {
        Box::new(raw.split('.'))
    };

    parts
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Concept prompt handed to the script generator
pub fn build_concept(question: &str, steps: &ExplanationSteps) -> String {
    format!(
        "Topic: {}\n\nExplanation Steps:\n{}\n\nDetailed Explanation:\n{}\n",
        question.trim(),
        steps.steps.join("\n"),
        steps.explanation
    )
}

/// Remove a Markdown code fence wrapped around model output
///
/// Handles an opening fence with or without a language tag and an optional
/// closing fence. Text without fences is only trimmed.
pub fn strip_code_fences(content: &str) -> String {
    let mut body = content.trim();

    if let Some(rest) = body.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '-')
            .unwrap_or(rest.len());
        body = &rest[tag_len..];
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }

    body.trim().to_string()
}
