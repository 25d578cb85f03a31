use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// A coding problem presented during the DSA phase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CodingQuestion {
    pub title: String,
    pub difficulty: String,
    pub category: String,
    pub problem_statement: String,
    #[serde(default)]
    #[cfg_attr(feature = "typescript", ts(type = "Array<Record<string, string>>"))]
    #[schema(value_type = Vec<Object>)]
    pub examples: Vec<Map<String, Value>>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub optimal_approach: Option<String>,
    #[serde(default)]
    pub time_complexity: Option<String>,
    #[serde(default)]
    pub space_complexity: Option<String>,
}

/// The final hiring report compiled when the workflow reaches report
/// generation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct FinalReport {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub overall_score: f64,
    pub dsa_score: f64,
    pub code_quality_score: f64,
    pub system_design_score: f64,
    pub behavioral_score: f64,
    pub recommendation: String,
    pub detailed_feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

/// One remembered item in the similarity store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MemoryEntry {
    pub id: Uuid,
    pub session_id: Option<Uuid>,
    pub content: String,
    #[cfg_attr(feature = "typescript", ts(type = "Record<string, unknown>"))]
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_deserializes_with_missing_optionals() {
        let json = r#"{
            "title": "Two Sum",
            "difficulty": "Easy",
            "category": "Arrays",
            "problem_statement": "Given an array of integers..."
        }"#;

        let question: CodingQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(question.title, "Two Sum");
        assert!(question.hints.is_empty());
        assert!(question.time_complexity.is_none());
    }

    #[test]
    fn test_report_round_trip() {
        let report = FinalReport {
            session_id: Uuid::new_v4(),
            candidate_name: "Ada".to_string(),
            overall_score: 7.5,
            dsa_score: 8.0,
            code_quality_score: 7.0,
            system_design_score: 7.0,
            behavioral_score: 8.0,
            recommendation: "hire".to_string(),
            detailed_feedback: "Solid fundamentals".to_string(),
            strengths: vec!["problem decomposition".to_string()],
            improvements: vec![],
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: FinalReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recommendation, "hire");
        assert_eq!(back.strengths.len(), 1);
    }
}
