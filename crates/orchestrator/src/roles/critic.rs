//! Critic: challenges the other evaluators' scores during the debate phase.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use interview_core::{AgentResponse, AgentRole, InterviewContext};

use crate::capability::Capability;
use crate::error::Result;
use crate::roles::recent_evaluation_lines;
use crate::services::parser::extract_json;
use crate::services::{LlmClient, RolePrompts};

const RECENT_EVALUATIONS: usize = 6;

pub struct CriticRole {
    llm: LlmClient,
}

impl CriticRole {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    async fn challenge_scores(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let scores = serde_json::to_value(&ctx.scores).unwrap_or_default();
        let evaluations = recent_evaluation_lines(ctx, RECENT_EVALUATIONS);

        let prompt = RolePrompts::critique(&scores, &evaluations);
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(critique) => {
                let influence = critique["recommendation_influence"]
                    .as_str()
                    .unwrap_or("neutral")
                    .to_string();
                ctx.set_score("critic_opinion", json!(influence));

                let argument = critique["debate_argument"]
                    .as_str()
                    .unwrap_or("I have concerns about the evaluation scores.")
                    .to_string();

                let mut metadata = Map::new();
                metadata.insert("critique".to_string(), critique);
                Ok(AgentResponse::new(argument, 0.8).with_metadata(metadata))
            }
            Err(_) => {
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                Ok(AgentResponse::new(
                    "I have reservations about some of the scores given. Let's keep the \
                     hiring bar consistent.",
                    0.5,
                )
                .with_metadata(metadata))
            }
        }
    }
}

#[async_trait]
impl Capability for CriticRole {
    fn role(&self) -> AgentRole {
        AgentRole::Critic
    }

    async fn act(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.challenge_scores(ctx).await
    }

    async fn evaluate(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.challenge_scores(ctx).await
    }
}
