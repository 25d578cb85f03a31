//! Fact checker: validates evaluator claims against what the candidate
//! actually said. Runs after the critic in the debate phase, so it also
//! sees the critic's argument.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use interview_core::{AgentResponse, AgentRole, InterviewContext};

use crate::capability::Capability;
use crate::error::Result;
use crate::roles::recent_evaluation_lines;
use crate::services::parser::{as_f64_lenient, extract_json};
use crate::services::{LlmClient, RolePrompts};

const RECENT_EVALUATIONS: usize = 5;
const RECENT_ANSWERS: usize = 3;

pub struct FactCheckerRole {
    llm: LlmClient,
}

impl FactCheckerRole {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    fn summarize(validation: &Value) -> String {
        if !validation["hallucinations_detected"]
            .as_bool()
            .unwrap_or(false)
        {
            return validation["validation_summary"]
                .as_str()
                .unwrap_or("All evaluator claims are factually grounded.")
                .to_string();
        }

        let mut content = String::from("Validation issues detected.\n");
        if let Some(praise) = validation["unsupported_praise"].as_array() {
            for claim in praise.iter().filter_map(Value::as_str) {
                content.push_str(&format!("- Unsupported praise: {claim}\n"));
            }
        }
        if let Some(criticism) = validation["unsupported_criticism"].as_array() {
            for claim in criticism.iter().filter_map(Value::as_str) {
                content.push_str(&format!("- Unsupported criticism: {claim}\n"));
            }
        }
        content
    }

    async fn validate_evaluations(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let evaluations = recent_evaluation_lines(ctx, RECENT_EVALUATIONS);
        if evaluations.is_empty() {
            let mut metadata = Map::new();
            metadata.insert("status".to_string(), json!("no_data"));
            return Ok(
                AgentResponse::new("No evaluations to validate yet.", 1.0).with_metadata(metadata)
            );
        }

        let answers: Vec<String> = ctx
            .answers
            .iter()
            .rev()
            .take(RECENT_ANSWERS)
            .rev()
            .cloned()
            .collect();

        let prompt = RolePrompts::fact_check(&answers, &evaluations);
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(validation) => {
                let confidence = as_f64_lenient(&validation["accuracy_score"])
                    .map(|score| score / 10.0)
                    .unwrap_or(1.0);
                let content = Self::summarize(&validation);

                let mut metadata = Map::new();
                metadata.insert("validation".to_string(), validation);
                Ok(AgentResponse::new(content, confidence).with_metadata(metadata))
            }
            Err(_) => {
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                Ok(AgentResponse::new("Validation check completed.", 0.5).with_metadata(metadata))
            }
        }
    }
}

#[async_trait]
impl Capability for FactCheckerRole {
    fn role(&self) -> AgentRole {
        AgentRole::FactChecker
    }

    async fn act(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.validate_evaluations(ctx).await
    }

    async fn evaluate(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.validate_evaluations(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_when_grounded() {
        let validation = json!({
            "hallucinations_detected": false,
            "validation_summary": "Claims are supported."
        });
        assert_eq!(FactCheckerRole::summarize(&validation), "Claims are supported.");
    }

    #[test]
    fn test_summary_lists_unsupported_claims() {
        let validation = json!({
            "hallucinations_detected": true,
            "unsupported_praise": ["said candidate analyzed complexity"],
            "unsupported_criticism": ["claimed no edge cases were handled"]
        });

        let summary = FactCheckerRole::summarize(&validation);
        assert!(summary.contains("Unsupported praise: said candidate analyzed complexity"));
        assert!(summary.contains("Unsupported criticism: claimed no edge cases were handled"));
    }

    #[tokio::test]
    async fn test_no_evaluations_short_circuits() {
        let role = FactCheckerRole::new(LlmClient::new(Default::default()));
        let mut ctx = InterviewContext::new("Ada");

        let response = role.act(&mut ctx).await.unwrap();
        assert_eq!(response.confidence, 1.0);
        assert!(response.content.contains("No evaluations"));
        assert_eq!(response.metadata.get("status"), Some(&json!("no_data")));
    }
}
