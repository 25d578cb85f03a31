//! Recruiter: resume analysis and interview planning.
//!
//! The first `act` extracts a structured skill profile from the resume and
//! derives the recommended difficulty; once a profile exists, `act`
//! generates the interview plan instead.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use interview_core::{AgentResponse, AgentRole, Difficulty, InterviewContext};

use crate::capability::Capability;
use crate::error::Result;
use crate::services::parser::{as_f64_lenient, extract_json};
use crate::services::{LlmClient, RolePrompts};

pub struct RecruiterRole {
    llm: LlmClient,
}

impl RecruiterRole {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Difficulty recommendation from the extracted profile: advanced DSA
    /// skills or five-plus years push to hard, intermediate or two-plus
    /// years to medium, everything else stays easy.
    fn determine_difficulty(profile: &Value) -> Difficulty {
        let dsa_level = profile["dsa_level"]
            .as_str()
            .unwrap_or("beginner")
            .to_lowercase();
        let experience = as_f64_lenient(&profile["experience_years"]).unwrap_or(0.0);

        if dsa_level == "advanced" || experience >= 5.0 {
            Difficulty::Hard
        } else if dsa_level == "intermediate" || experience >= 2.0 {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }

    async fn analyze_resume(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let Some(resume) = ctx.resume.clone() else {
            return Ok(AgentResponse::new("No resume provided", 0.0));
        };

        let prompt = RolePrompts::resume_analysis(&resume);
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(profile) => {
                let difficulty = Self::determine_difficulty(&profile);
                ctx.skill_profile = Some(profile.clone());
                ctx.difficulty = difficulty;

                let dsa_level = profile["dsa_level"].as_str().unwrap_or("unknown");
                let mut metadata = Map::new();
                metadata.insert("skill_profile".to_string(), profile.clone());
                metadata.insert("difficulty".to_string(), json!(difficulty.as_str()));

                Ok(AgentResponse::new(
                    format!(
                        "Resume analyzed. Candidate shows {dsa_level} DSA skills. \
                         Recommended difficulty: {difficulty}"
                    ),
                    0.85,
                )
                .with_reasoning("Based on experience and project complexity")
                .with_metadata(metadata))
            }
            Err(error) => {
                debug!(%error, "Skill profile did not parse, keeping raw response");
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                metadata.insert("error".to_string(), json!(error.to_string()));
                Ok(AgentResponse::new(
                    "Resume analyzed but the structured profile could not be parsed.",
                    0.5,
                )
                .with_metadata(metadata))
            }
        }
    }

    async fn generate_plan(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let profile = ctx.skill_profile.clone().unwrap_or(Value::Null);
        let prompt = RolePrompts::interview_plan(&profile);
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(plan) => {
                ctx.interview_plan = Some(plan.clone());
                let focus = plan["focus_areas"]
                    .as_array()
                    .map(|areas| {
                        areas
                            .iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();

                let mut metadata = Map::new();
                metadata.insert("interview_plan".to_string(), plan);
                Ok(
                    AgentResponse::new(format!("Interview plan generated. Focus: {focus}"), 0.9)
                        .with_metadata(metadata),
                )
            }
            Err(_) => {
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                Ok(AgentResponse::new("Generated interview plan", 0.7).with_metadata(metadata))
            }
        }
    }
}

#[async_trait]
impl Capability for RecruiterRole {
    fn role(&self) -> AgentRole {
        AgentRole::Recruiter
    }

    async fn act(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        if ctx.skill_profile.is_none() {
            self.analyze_resume(ctx).await
        } else {
            self.generate_plan(ctx).await
        }
    }

    async fn evaluate(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        self.act(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_from_dsa_level() {
        assert_eq!(
            RecruiterRole::determine_difficulty(&json!({"dsa_level": "advanced"})),
            Difficulty::Hard
        );
        assert_eq!(
            RecruiterRole::determine_difficulty(&json!({"dsa_level": "intermediate"})),
            Difficulty::Medium
        );
        assert_eq!(
            RecruiterRole::determine_difficulty(&json!({"dsa_level": "beginner"})),
            Difficulty::Easy
        );
    }

    #[test]
    fn test_difficulty_from_experience() {
        assert_eq!(
            RecruiterRole::determine_difficulty(
                &json!({"dsa_level": "beginner", "experience_years": 6})
            ),
            Difficulty::Hard
        );
        assert_eq!(
            RecruiterRole::determine_difficulty(
                &json!({"dsa_level": "beginner", "experience_years": 3})
            ),
            Difficulty::Medium
        );
    }

    #[test]
    fn test_difficulty_defaults_to_easy_for_empty_profile() {
        assert_eq!(
            RecruiterRole::determine_difficulty(&json!({})),
            Difficulty::Easy
        );
    }

    #[tokio::test]
    async fn test_act_without_resume_degrades() {
        let role = RecruiterRole::new(LlmClient::new(Default::default()));
        let mut ctx = InterviewContext::new("Ada");

        let response = role.act(&mut ctx).await.unwrap();
        assert_eq!(response.confidence, 0.0);
        assert!(response.content.contains("No resume"));
    }
}
