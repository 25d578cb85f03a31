//! Code evaluator: deep review of the most recent submitted solution.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use interview_core::{AgentResponse, AgentRole, InterviewContext};

use crate::capability::Capability;
use crate::error::Result;
use crate::services::parser::{as_f64_lenient, extract_json};
use crate::services::{LlmClient, RolePrompts};

pub struct CodeEvaluatorRole {
    llm: LlmClient,
}

impl CodeEvaluatorRole {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    fn format_feedback(evaluation: &Value) -> String {
        let mut parts = vec![evaluation["detailed_feedback"]
            .as_str()
            .unwrap_or("Code reviewed.")
            .to_string()];

        if let Some(bugs) = non_empty_list(&evaluation["bugs"]) {
            parts.push(format!("\n**Bugs found:** {}", bugs.join(", ")));
        }
        if let Some(cases) = non_empty_list(&evaluation["missed_edge_cases"]) {
            parts.push(format!("\n**Missed edge cases:** {}", cases.join(", ")));
        }
        if let Some(suggestions) = non_empty_list(&evaluation["suggested_improvements"]) {
            parts.push(format!("\n**Suggestions:** {}", suggestions.join("; ")));
        }
        parts.join("\n")
    }

    async fn review_code(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let question = ctx.current_question.clone().unwrap_or_else(|| json!({}));
        let code = ctx.last_answer().unwrap_or_default().to_string();

        let prompt = RolePrompts::code_review(&question, &code);
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(evaluation) => {
                let overall = as_f64_lenient(&evaluation["scores"]["overall"]).unwrap_or(5.0);
                ctx.set_score("code_quality", json!(overall));

                let content = Self::format_feedback(&evaluation);
                let mut metadata = Map::new();
                metadata.insert("code_evaluation".to_string(), evaluation);
                metadata.insert("score".to_string(), json!(overall));

                Ok(AgentResponse::new(content, 0.88).with_metadata(metadata))
            }
            Err(_) => {
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                Ok(AgentResponse::new(
                    "Code reviewed. I've analyzed your solution for correctness, efficiency, \
                     and style.",
                    0.5,
                )
                .with_metadata(metadata))
            }
        }
    }
}

fn non_empty_list(value: &Value) -> Option<Vec<&str>> {
    let items: Vec<&str> = value.as_array()?.iter().filter_map(Value::as_str).collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[async_trait]
impl Capability for CodeEvaluatorRole {
    fn role(&self) -> AgentRole {
        AgentRole::CodeEvaluator
    }

    async fn act(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.review_code(ctx).await
    }

    async fn evaluate(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.review_code(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_includes_bugs_and_suggestions() {
        let evaluation = json!({
            "detailed_feedback": "Correct use of a hash map.",
            "bugs": ["overflow on large inputs"],
            "missed_edge_cases": ["empty array"],
            "suggested_improvements": ["validate inputs"]
        });

        let feedback = CodeEvaluatorRole::format_feedback(&evaluation);
        assert!(feedback.contains("hash map"));
        assert!(feedback.contains("overflow on large inputs"));
        assert!(feedback.contains("empty array"));
        assert!(feedback.contains("validate inputs"));
    }

    #[test]
    fn test_feedback_omits_empty_sections() {
        let evaluation = json!({
            "detailed_feedback": "Looks good.",
            "bugs": [],
            "missed_edge_cases": []
        });

        let feedback = CodeEvaluatorRole::format_feedback(&evaluation);
        assert_eq!(feedback, "Looks good.");
    }
}
