//! Final report compilation from the session's accumulated scores.

use serde_json::Value;

use interview_core::{AgentRole, FinalReport, InterviewContext, MessageKind};

use crate::services::parser::as_f64_lenient;

const SCORE_CATEGORIES: [&str; 4] = ["dsa", "code_quality", "system_design", "behavioral"];

fn category_score(ctx: &InterviewContext, category: &str) -> Option<f64> {
    ctx.score(category).and_then(as_f64_lenient)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Derive a recommendation from the overall score when the final-decision
/// role did not record one.
fn fallback_recommendation(overall: f64) -> &'static str {
    if overall >= 7.0 {
        "hire"
    } else if overall >= 5.0 {
        "lean_hire"
    } else {
        "no_hire"
    }
}

/// Compile the final report from whatever the roles have folded into the
/// context so far. Missing categories score zero; the final-decision
/// output wins over derived values where present.
pub fn compile_report(ctx: &InterviewContext) -> FinalReport {
    let present: Vec<f64> = SCORE_CATEGORIES
        .iter()
        .filter_map(|category| category_score(ctx, category))
        .collect();

    let overall = category_score(ctx, "overall").unwrap_or_else(|| {
        if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        }
    });

    let recommendation = ctx
        .score("final_recommendation")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback_recommendation(overall).to_string());

    let detailed_feedback = ctx
        .messages
        .iter()
        .rev()
        .find(|m| m.sender == AgentRole::FinalDecision && m.kind == MessageKind::Feedback)
        .map(|m| m.content.clone())
        .unwrap_or_else(|| {
            format!(
                "Interview covered {} evaluated categories with an overall score of {overall:.1}.",
                present.len()
            )
        });

    let profile = ctx.skill_profile.as_ref();

    FinalReport {
        session_id: ctx.id,
        candidate_name: ctx.candidate_name.clone(),
        overall_score: overall,
        dsa_score: category_score(ctx, "dsa").unwrap_or(0.0),
        code_quality_score: category_score(ctx, "code_quality").unwrap_or(0.0),
        system_design_score: category_score(ctx, "system_design").unwrap_or(0.0),
        behavioral_score: category_score(ctx, "behavioral").unwrap_or(0.0),
        recommendation,
        detailed_feedback,
        strengths: string_list(profile.map(|p| &p["strengths"])),
        improvements: string_list(profile.map(|p| &p["gaps"])),
    }
}
