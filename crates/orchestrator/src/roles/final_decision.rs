//! Final decision maker: synthesizes every score and debate point into a
//! hiring recommendation.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use interview_core::{AgentResponse, AgentRole, InterviewContext};

use crate::capability::Capability;
use crate::error::Result;
use crate::roles::recent_evaluation_lines;
use crate::services::parser::{as_f64_lenient, extract_json};
use crate::services::{LlmClient, RolePrompts};

const RECENT_EVALUATIONS: usize = 8;

pub struct FinalDecisionRole {
    llm: LlmClient,
}

impl FinalDecisionRole {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    fn format_decision(decision: &Value) -> String {
        let recommendation = decision["recommendation"]
            .as_str()
            .unwrap_or("no_decision")
            .to_uppercase();
        let confidence = (decision["confidence"].as_f64().unwrap_or(0.0) * 100.0) as u32;
        let overall = as_f64_lenient(&decision["overall_score"]).unwrap_or(0.0);
        let feedback = decision["detailed_feedback"].as_str().unwrap_or("");

        format!(
            "**Final decision: {recommendation}** (confidence: {confidence}%)\n\n\
             **Overall score: {overall}/10**\n\n{feedback}"
        )
    }

    async fn decide(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let scores = serde_json::to_value(&ctx.scores).unwrap_or_default();
        let evaluations = recent_evaluation_lines(ctx, RECENT_EVALUATIONS);

        let prompt = RolePrompts::final_decision(
            &ctx.candidate_name,
            ctx.difficulty,
            ctx.skill_profile.as_ref(),
            &scores,
            &evaluations,
        );
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(decision) => {
                let recommendation = decision["recommendation"]
                    .as_str()
                    .unwrap_or("no_decision")
                    .to_string();
                let overall = as_f64_lenient(&decision["overall_score"]).unwrap_or(0.0);
                ctx.set_score("final_recommendation", json!(recommendation));
                ctx.set_score("overall", json!(overall));

                let confidence = decision["confidence"].as_f64().unwrap_or(0.7);
                let content = Self::format_decision(&decision);

                let mut metadata = Map::new();
                metadata.insert("decision".to_string(), decision);
                Ok(AgentResponse::new(content, confidence).with_metadata(metadata))
            }
            Err(_) => {
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                Ok(AgentResponse::new(
                    "Based on the interview performance, here is my final assessment.",
                    0.5,
                )
                .with_metadata(metadata))
            }
        }
    }
}

#[async_trait]
impl Capability for FinalDecisionRole {
    fn role(&self) -> AgentRole {
        AgentRole::FinalDecision
    }

    async fn act(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.decide(ctx).await
    }

    async fn evaluate(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.decide(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_formatting() {
        let decision = json!({
            "recommendation": "hire",
            "confidence": 0.78,
            "overall_score": 7.5,
            "detailed_feedback": "Solid algorithmic thinking and clean code."
        });

        let content = FinalDecisionRole::format_decision(&decision);
        assert!(content.contains("Final decision: HIRE"));
        assert!(content.contains("confidence: 78%"));
        assert!(content.contains("7.5/10"));
        assert!(content.contains("clean code"));
    }

    #[test]
    fn test_decision_formatting_with_missing_fields() {
        let content = FinalDecisionRole::format_decision(&json!({}));
        assert!(content.contains("NO_DECISION"));
        assert!(content.contains("0/10"));
    }
}
