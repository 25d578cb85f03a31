//! Behavioral interviewer: STAR-method questions targeting profile gaps.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use interview_core::{AgentResponse, AgentRole, InterviewContext};

use crate::capability::Capability;
use crate::error::Result;
use crate::services::parser::{as_f64_lenient, extract_json};
use crate::services::{LlmClient, RolePrompts};

pub struct BehavioralRole {
    llm: LlmClient,
}

impl BehavioralRole {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    fn profile_gaps(ctx: &InterviewContext) -> Vec<String> {
        ctx.skill_profile
            .as_ref()
            .and_then(|profile| profile["gaps"].as_array().cloned())
            .map(|gaps| {
                gaps.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn generate_question(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let gaps = Self::profile_gaps(ctx);
        let prompt = RolePrompts::behavioral_question(ctx.difficulty, &gaps);
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(question) => {
                ctx.current_question = Some(question.clone());
                let text = question["question"]
                    .as_str()
                    .unwrap_or("Tell me about a challenging project you worked on.")
                    .to_string();

                let mut metadata = Map::new();
                metadata.insert("question".to_string(), question);
                Ok(AgentResponse::new(text, 0.88).with_metadata(metadata))
            }
            Err(_) => {
                let fallback = json!({
                    "question": "Tell me about a time you had to debug a critical production \
                                 issue under time pressure.",
                    "follow_ups": ["What would you do differently?"],
                    "evaluation_focus": ["Problem-solving approach", "Communication under stress"]
                });
                ctx.current_question = Some(fallback.clone());

                let mut metadata = Map::new();
                metadata.insert("question".to_string(), fallback.clone());
                metadata.insert("raw_response".to_string(), json!(raw));
                Ok(
                    AgentResponse::new(fallback["question"].as_str().unwrap_or(""), 0.7)
                        .with_metadata(metadata),
                )
            }
        }
    }

    async fn evaluate_answer(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let question = ctx.current_question.clone().unwrap_or_else(|| json!({}));
        let answer = ctx.last_answer().unwrap_or_default().to_string();

        let prompt = RolePrompts::behavioral_evaluation(&question, &answer);
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(evaluation) => {
                let score = as_f64_lenient(&evaluation["overall_score"]).unwrap_or(5.0);
                ctx.set_score("behavioral", json!(score));

                let feedback = evaluation["feedback"]
                    .as_str()
                    .unwrap_or("Behavioral answer evaluated.")
                    .to_string();

                let mut metadata = Map::new();
                metadata.insert("evaluation".to_string(), evaluation);
                Ok(AgentResponse::new(feedback, 0.85).with_metadata(metadata))
            }
            Err(_) => {
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                Ok(AgentResponse::new(
                    "Thanks for sharing. I've noted how you approached the situation and its \
                     outcome.",
                    0.5,
                )
                .with_metadata(metadata))
            }
        }
    }
}

#[async_trait]
impl Capability for BehavioralRole {
    fn role(&self) -> AgentRole {
        AgentRole::Behavioral
    }

    async fn act(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        if ctx.current_question.is_none() {
            self.generate_question(ctx).await
        } else {
            self.evaluate_answer(ctx).await
        }
    }

    async fn evaluate(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.evaluate_answer(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_gaps_extraction() {
        let mut ctx = InterviewContext::new("Ada");
        assert!(BehavioralRole::profile_gaps(&ctx).is_empty());

        ctx.skill_profile = Some(json!({"gaps": ["distributed systems", "scaling"]}));
        assert_eq!(
            BehavioralRole::profile_gaps(&ctx),
            vec!["distributed systems", "scaling"]
        );
    }
}
