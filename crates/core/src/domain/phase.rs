use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;

/// A stage of the interview workflow graph.
///
/// The terminal phase is [`InterviewPhase::Completed`]; every other phase has
/// at least one legal successor in the orchestrator's transition table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema, Hash)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    #[default]
    Init,
    ResumeAnalysis,
    SkillProfiling,
    Dsa,
    CodeEvaluation,
    SystemDesign,
    Behavioral,
    CrossAgentDebate,
    FinalDecision,
    ReportGeneration,
    Completed,
}

impl InterviewPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ResumeAnalysis => "resume_analysis",
            Self::SkillProfiling => "skill_profiling",
            Self::Dsa => "dsa",
            Self::CodeEvaluation => "code_evaluation",
            Self::SystemDesign => "system_design",
            Self::Behavioral => "behavioral",
            Self::CrossAgentDebate => "cross_agent_debate",
            Self::FinalDecision => "final_decision",
            Self::ReportGeneration => "report_generation",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "init" => Some(Self::Init),
            "resume_analysis" => Some(Self::ResumeAnalysis),
            "skill_profiling" => Some(Self::SkillProfiling),
            "dsa" => Some(Self::Dsa),
            "code_evaluation" => Some(Self::CodeEvaluation),
            "system_design" => Some(Self::SystemDesign),
            "behavioral" => Some(Self::Behavioral),
            "cross_agent_debate" => Some(Self::CrossAgentDebate),
            "final_decision" => Some(Self::FinalDecision),
            "report_generation" => Some(Self::ReportGeneration),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether the workflow has reached its terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for InterviewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewPhase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::UnknownPhase(s.to_string()))
    }
}

/// A capability slot invoked during one or more phases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, Hash)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Recruiter,
    DsaInterviewer,
    CodeEvaluator,
    SystemDesign,
    Behavioral,
    Critic,
    FactChecker,
    FinalDecision,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recruiter => "recruiter",
            Self::DsaInterviewer => "dsa_interviewer",
            Self::CodeEvaluator => "code_evaluator",
            Self::SystemDesign => "system_design",
            Self::Behavioral => "behavioral",
            Self::Critic => "critic",
            Self::FactChecker => "fact_checker",
            Self::FinalDecision => "final_decision",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "recruiter" => Some(Self::Recruiter),
            "dsa_interviewer" => Some(Self::DsaInterviewer),
            "code_evaluator" => Some(Self::CodeEvaluator),
            "system_design" => Some(Self::SystemDesign),
            "behavioral" => Some(Self::Behavioral),
            "critic" => Some(Self::Critic),
            "fact_checker" => Some(Self::FactChecker),
            "final_decision" => Some(Self::FinalDecision),
            _ => None,
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}

/// Recommended question difficulty, derived from the candidate's profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_round_trip() {
        assert_eq!(InterviewPhase::Dsa.as_str(), "dsa");
        assert_eq!(
            InterviewPhase::parse("cross_agent_debate"),
            Some(InterviewPhase::CrossAgentDebate)
        );
        assert_eq!(InterviewPhase::parse("warmup"), None);
    }

    #[test]
    fn test_phase_from_str_rejects_unknown() {
        assert!("report_generation".parse::<InterviewPhase>().is_ok());
        assert!("warmup".parse::<InterviewPhase>().is_err());
    }

    #[test]
    fn test_terminal_phase() {
        assert!(InterviewPhase::Completed.is_terminal());
        assert!(!InterviewPhase::FinalDecision.is_terminal());
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(AgentRole::FactChecker.as_str(), "fact_checker");
        assert_eq!(AgentRole::parse("recruiter"), Some(AgentRole::Recruiter));
        assert_eq!(AgentRole::parse("barista"), None);
    }

    #[test]
    fn test_difficulty_default() {
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!(Difficulty::parse("hard"), Some(Difficulty::Hard));
    }
}
