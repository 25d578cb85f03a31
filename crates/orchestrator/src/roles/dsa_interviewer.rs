//! DSA interviewer: coding question generation and answer evaluation.
//!
//! The evaluation stamps the has-code payload marker that the coding-phase
//! branch policy reads, so this role is the upstream half of that contract.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::warn;

use interview_core::{
    payload_keys, AgentResponse, AgentRole, CodingQuestion, Difficulty, InterviewContext,
};

use crate::capability::Capability;
use crate::error::Result;
use crate::services::parser::{as_f64_lenient, extract_json};
use crate::services::{LlmClient, RolePrompts};

pub struct DsaInterviewerRole {
    llm: LlmClient,
}

impl DsaInterviewerRole {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Heuristic for the has-code marker: fenced blocks, function or class
    /// definitions, return statements, and statement-terminated lines all
    /// count as code.
    pub fn answer_has_code(answer: &str) -> bool {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(
                r"(?m)```|\bdef\s+\w+|\bfn\s+\w+|\bfunc\s+\w+|\bclass\s+\w+|\breturn\b|=>|[{};]\s*$",
            )
            .expect("static regex is valid")
        });
        pattern.is_match(answer)
    }

    fn fallback_question(difficulty: Difficulty) -> CodingQuestion {
        let question = match difficulty {
            Difficulty::Easy => json!({
                "title": "Two Sum",
                "difficulty": "Easy",
                "category": "Arrays",
                "problem_statement": "Given an array of integers nums and an integer target, \
                    return indices of the two numbers such that they add up to target. You may \
                    assume exactly one solution exists and may not use the same element twice.",
                "examples": [{"input": "nums = [2,7,11,15], target = 9", "output": "[0,1]",
                              "explanation": "nums[0] + nums[1] = 9"}],
                "constraints": ["2 <= nums.length <= 10^4"],
                "hints": ["Try using a hash map",
                          "For each number, check whether target minus it was already seen"],
                "optimal_approach": "Hash map for O(n) time",
                "time_complexity": "O(n)",
                "space_complexity": "O(n)"
            }),
            Difficulty::Medium => json!({
                "title": "Longest Substring Without Repeating Characters",
                "difficulty": "Medium",
                "category": "Sliding Window",
                "problem_statement": "Given a string s, find the length of the longest substring \
                    without repeating characters.",
                "examples": [{"input": "s = \"abcabcbb\"", "output": "3",
                              "explanation": "The answer is \"abc\", with length 3"}],
                "constraints": ["0 <= s.length <= 5 * 10^4"],
                "hints": ["Use a sliding window",
                          "Track the characters of the current window in a set"],
                "optimal_approach": "Sliding window with a hash set",
                "time_complexity": "O(n)",
                "space_complexity": "O(min(m,n))"
            }),
            Difficulty::Hard => json!({
                "title": "Median of Two Sorted Arrays",
                "difficulty": "Hard",
                "category": "Binary Search",
                "problem_statement": "Given two sorted arrays nums1 and nums2 of size m and n, \
                    return the median of the combined arrays in O(log(m+n)) time.",
                "examples": [{"input": "nums1 = [1,3], nums2 = [2]", "output": "2.0",
                              "explanation": "Merged = [1,2,3], median = 2"}],
                "constraints": ["0 <= m, n <= 1000", "1 <= m + n"],
                "hints": ["Binary search on the smaller array",
                          "Think about partitioning both arrays"],
                "optimal_approach": "Binary search for O(log(min(m,n)))",
                "time_complexity": "O(log(min(m,n)))",
                "space_complexity": "O(1)"
            }),
        };
        serde_json::from_value(question).expect("static fallback question is valid")
    }

    async fn generate_question(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let prompt = RolePrompts::dsa_question(ctx.difficulty, ctx.skill_profile.as_ref());
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        let (question, confidence) = match extract_json::<CodingQuestion>(&raw) {
            Ok(question) => (question, 0.9),
            Err(error) => {
                warn!(%error, "Generated question did not parse, using fallback bank");
                (Self::fallback_question(ctx.difficulty), 0.7)
            }
        };

        let question_value = serde_json::to_value(&question).unwrap_or_default();
        ctx.current_question = Some(question_value.clone());

        let mut metadata = Map::new();
        metadata.insert("question".to_string(), question_value);

        Ok(AgentResponse::new(
            format!(
                "Here's your {} question: **{}**\n\n{}",
                question.difficulty, question.title, question.problem_statement
            ),
            confidence,
        )
        .with_metadata(metadata))
    }

    async fn evaluate_answer(&self, ctx: &mut InterviewContext) -> Result<AgentResponse> {
        let question = ctx.current_question.clone().unwrap_or_else(|| json!({}));
        let answer = ctx.last_answer().unwrap_or_default().to_string();
        let has_code = Self::answer_has_code(&answer);

        let prompt = RolePrompts::dsa_evaluation(&question, &answer);
        let raw = self
            .llm
            .chat(Some(RolePrompts::system(self.role())), &prompt)
            .await?;

        match extract_json::<Value>(&raw) {
            Ok(evaluation) => {
                let score = as_f64_lenient(&evaluation["overall_score"]).unwrap_or(5.0);
                ctx.set_score("dsa", json!(score));

                let feedback = evaluation["feedback"].as_str().unwrap_or("Answer evaluated.");
                let mut content = feedback.to_string();
                if let Some(follow_up) = evaluation["follow_up_question"].as_str() {
                    if !follow_up.is_empty() {
                        content.push_str(&format!("\n\n**Follow-up:** {follow_up}"));
                    }
                }

                let mut metadata = Map::new();
                metadata.insert("evaluation".to_string(), evaluation);
                metadata.insert(payload_keys::HAS_CODE.to_string(), json!(has_code));

                Ok(AgentResponse::new(content, 0.85).with_metadata(metadata))
            }
            Err(_) => {
                let mut metadata = Map::new();
                metadata.insert("raw_response".to_string(), json!(raw));
                metadata.insert(payload_keys::HAS_CODE.to_string(), json!(has_code));
                Ok(AgentResponse::new(
                    "I've reviewed your answer. Let's discuss your approach and complexity \
                     analysis.",
                    0.5,
                )
                .with_metadata(metadata))
            }
        }
    }
}

#[async_trait]
impl Capability for DsaInterviewerRole {
    fn role(&self) -> AgentRole {
        AgentRole::DsaInterviewer
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
    fn test_code_detection_positive() {
        assert!(DsaInterviewerRole::answer_has_code(
            "def two_sum(nums, target):\n    seen = {}"
        ));
        assert!(DsaInterviewerRole::answer_has_code(
            "fn main() { println!(\"hi\"); }"
        ));
        assert!(DsaInterviewerRole::answer_has_code(
            "```python\nprint('x')\n```"
        ));
        assert!(DsaInterviewerRole::answer_has_code(
            "I would return the first index found"
        ));
    }

    #[test]
    fn test_code_detection_negative() {
        assert!(!DsaInterviewerRole::answer_has_code(
            "I would use a hash map and scan the array once"
        ));
        assert!(!DsaInterviewerRole::answer_has_code(
            "The time complexity is O(n) because each element is visited once"
        ));
    }

    #[test]
    fn test_fallback_bank_covers_every_difficulty() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let question = DsaInterviewerRole::fallback_question(difficulty);
            assert!(!question.title.is_empty());
            assert!(!question.hints.is_empty());
            assert!(!question.problem_statement.is_empty());
        }
    }
}
