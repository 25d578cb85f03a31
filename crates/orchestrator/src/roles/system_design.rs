//! System design interviewer: architecture questions and proposal
//! evaluation.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::warn;

use interview_core::{AgentResponse, AgentRole, InterviewContext};

use crate::capability::Capability;
use crate::error::Result;
use crate::services::parser::{as_f64_lenient, extract_json};
use crate::services::{LlmClient, RolePrompts};

pub struct SystemDesignRole {
    llm: LlmClient,
}

impl SystemDesignRole {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    async fn generate_question(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let prompt = RolePrompts::system_design_question(ctx.difficulty, ctx.skill_profile.as_ref());
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(question) => {
                ctx.current_question = Some(question.clone());

                let title = question["title"].as_str().unwrap_or("System design question");
                let statement = question["problem_statement"].as_str().unwrap_or("");
                let requirements = question["requirements"]
                    .as_array()
                    .map(|reqs| {
                        reqs.iter()
                            .filter_map(Value::as_str)
                            .map(|r| format!("- {r}"))
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                    .unwrap_or_default();

                let mut metadata = Map::new();
                metadata.insert("question".to_string(), question.clone());

                Ok(AgentResponse::new(
                    format!("**{title}**\n\n{statement}\n\nRequirements:\n{requirements}"),
                    0.88,
                )
                .with_metadata(metadata))
            }
            Err(error) => {
                warn!(%error, "System design question did not parse");
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                Ok(AgentResponse::new(
                    "Let's move to system design. Walk me through how you would design a \
                     URL shortener that serves 100M requests per day.",
                    0.6,
                )
                .with_metadata(metadata))
            }
        }
    }

    async fn evaluate_proposal(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let question = ctx.current_question.clone().unwrap_or_else(|| json!({}));
        let answer = ctx.last_answer().unwrap_or_default().to_string();

        let prompt = RolePrompts::system_design_evaluation(&question, &answer);
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(evaluation) => {
                let score = as_f64_lenient(&evaluation["overall_score"]).unwrap_or(5.0);
                ctx.set_score("system_design", json!(score));

                let feedback = evaluation["feedback"]
                    .as_str()
                    .unwrap_or("Design proposal evaluated.")
                    .to_string();

                let mut metadata = Map::new();
                metadata.insert("evaluation".to_string(), evaluation);

                Ok(AgentResponse::new(feedback, 0.85).with_metadata(metadata))
            }
            Err(_) => {
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                Ok(AgentResponse::new(
                    "I've reviewed your design. Let's talk through scalability and failure \
                     handling.",
                    0.5,
                )
                .with_metadata(metadata))
            }
        }
    }
}

#[async_trait]
impl Capability for SystemDesignRole {
    fn role(&self) -> AgentRole {
        AgentRole::SystemDesign
    }

    async fn act(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        if ctx.current_question.is_none() {
            self.generate_question(ctx).await
        } else {
            self.evaluate_proposal(ctx).await
        }
    }

    async fn evaluate(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.evaluate_proposal(ctx).await
    }
}
