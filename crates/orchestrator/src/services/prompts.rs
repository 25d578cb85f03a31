//! Prompt construction for the built-in roles.
//!
//! Each role gets a fixed system prompt plus a per-operation user prompt
//! that embeds the relevant slice of the interview context. Prompts ask for
//! bare JSON; `services::parser` cleans up what actually comes back.

use serde_json::Value;

use interview_core::{AgentRole, Difficulty};

pub struct RolePrompts;

impl RolePrompts {
    pub fn system(role: AgentRole) -> &'static str {
        match role {
            AgentRole::Recruiter => {
                "You are an expert technical recruiter with deep knowledge of software \
                 engineering roles. Analyze resumes thoroughly, extract skills and experience \
                 levels, identify gaps to probe during the interview, and recommend question \
                 difficulty. Be analytical, objective, and focus on technical competencies."
            }
            AgentRole::DsaInterviewer => {
                "You are an expert DSA interviewer from a top tech company. Ask coding \
                 questions appropriate to the candidate's level, provide hints when they are \
                 stuck, evaluate the approach before the solution, and probe time/space \
                 complexity. Be encouraging but rigorous; focus on problem-solving thinking, \
                 not just correct answers."
            }
            AgentRole::CodeEvaluator => {
                "You are an expert code reviewer at a top tech company. Analyze code for \
                 correctness, efficiency, and style, detect missed edge cases, verify \
                 complexity claims, and give constructive, specific feedback. Be thorough but \
                 fair; a good solution with minor issues should score well."
            }
            AgentRole::SystemDesign => {
                "You are a senior staff engineer conducting a system design interview. \
                 Generate realistic design questions, evaluate proposals for scalability, \
                 reliability, and trade-offs, and assess understanding of databases, caching, \
                 load balancing, and failure modes. Look for depth, not memorized patterns."
            }
            AgentRole::Behavioral => {
                "You are an experienced hiring manager conducting behavioral interviews. Ask \
                 situational questions that reveal problem-solving, communication, and \
                 leadership, evaluate answers with the STAR method, and watch for red flags \
                 and growth mindset."
            }
            AgentRole::Critic => {
                "You are a critical senior engineer who challenges evaluation scores. Push \
                 back on overly generous scores, point out what evaluations missed, and \
                 advocate for the hiring bar, while recognizing when other evaluators are \
                 being too harsh. Argue with evidence from the candidate's answers."
            }
            AgentRole::FactChecker => {
                "You are a fact-checker that validates evaluator claims against ground truth. \
                 Check whether claims are supported by the candidate's actual answers, detect \
                 invented facts and overly generous interpretations, and cite specific \
                 evidence."
            }
            AgentRole::FinalDecision => {
                "You are the hiring manager making the final decision. Synthesize all \
                 evaluations, debate points, and scores into a final recommendation. Be \
                 balanced, data-driven, and justify the decision clearly, considering \
                 technical and soft skills."
            }
        }
    }

    pub fn resume_analysis(resume: &str) -> String {
        format!(
            "Analyze this resume and extract programming languages with proficiency, \
             frameworks, estimated years of experience, algorithm/data-structure experience \
             level, system design experience level, project complexity, strengths, and gaps.\n\n\
             Resume:\n{resume}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"languages\": {{\"python\": \"advanced\"}},\n\
                 \"frameworks\": [\"react\"],\n\
                 \"experience_years\": 2,\n\
                 \"dsa_level\": \"intermediate\",\n\
                 \"system_design_level\": \"beginner\",\n\
                 \"projects_complexity\": \"medium\",\n\
                 \"strengths\": [\"full-stack\"],\n\
                 \"gaps\": [\"distributed systems\"]\n\
             }}"
        )
    }

    pub fn interview_plan(skill_profile: &Value) -> String {
        format!(
            "Given this skill profile, create an interview plan: which areas to focus on, \
             specific topics to probe based on gaps, and time allocation per phase.\n\n\
             Skill profile:\n{profile}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"focus_areas\": [\"dsa\", \"system_design\"],\n\
                 \"dsa_topics\": [\"arrays\", \"graphs\"],\n\
                 \"system_design_topics\": [\"caching\"],\n\
                 \"time_allocation\": {{\"dsa\": 30, \"system_design\": 20, \"behavioral\": 10}}\n\
             }}",
            profile = serde_json::to_string_pretty(skill_profile).unwrap_or_default()
        )
    }

    pub fn dsa_question(difficulty: Difficulty, skill_profile: Option<&Value>) -> String {
        let profile = skill_profile
            .map(|p| serde_json::to_string_pretty(p).unwrap_or_default())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "Generate ONE coding interview question at {difficulty} difficulty for a \
             candidate with this skill profile (use strengths and gaps to pick the topic):\n\
             {profile}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"title\": \"Two Sum\",\n\
                 \"difficulty\": \"Easy\",\n\
                 \"category\": \"Arrays\",\n\
                 \"problem_statement\": \"...\",\n\
                 \"examples\": [{{\"input\": \"...\", \"output\": \"...\", \"explanation\": \"...\"}}],\n\
                 \"constraints\": [\"...\"],\n\
                 \"hints\": [\"...\"],\n\
                 \"optimal_approach\": \"...\",\n\
                 \"time_complexity\": \"O(n)\",\n\
                 \"space_complexity\": \"O(n)\"\n\
             }}"
        )
    }

    pub fn dsa_evaluation(question: &Value, answer: &str) -> String {
        format!(
            "Evaluate this candidate's answer to a DSA question.\n\n\
             Question: {title}\n\
             Problem: {problem}\n\
             Optimal approach: {approach}\n\n\
             Candidate's answer:\n{answer}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"correctness_score\": 8,\n\
                 \"approach_score\": 7,\n\
                 \"code_quality_score\": 8,\n\
                 \"overall_score\": 7.5,\n\
                 \"is_correct\": true,\n\
                 \"complexity_correct\": true,\n\
                 \"strengths\": [\"...\"],\n\
                 \"improvements\": [\"...\"],\n\
                 \"feedback\": \"...\",\n\
                 \"follow_up_question\": \"...\"\n\
             }}",
            title = question["title"].as_str().unwrap_or("unknown"),
            problem = question["problem_statement"].as_str().unwrap_or(""),
            approach = question["optimal_approach"].as_str().unwrap_or("unknown"),
        )
    }

    pub fn code_review(question: &Value, code: &str) -> String {
        format!(
            "Perform a detailed code review of this solution.\n\n\
             Problem: {title}\n\
             Problem statement: {problem}\n\
             Optimal time complexity: {time}\n\
             Optimal space complexity: {space}\n\n\
             Candidate's code:\n```\n{code}\n```\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"syntax_valid\": true,\n\
                 \"logic_correct\": true,\n\
                 \"handles_edge_cases\": false,\n\
                 \"time_complexity\": \"O(n)\",\n\
                 \"space_complexity\": \"O(n)\",\n\
                 \"bugs\": [],\n\
                 \"missed_edge_cases\": [\"...\"],\n\
                 \"scores\": {{\"correctness\": 9, \"efficiency\": 8, \"style\": 7, \"overall\": 8}},\n\
                 \"detailed_feedback\": \"...\",\n\
                 \"suggested_improvements\": [\"...\"]\n\
             }}",
            title = question["title"].as_str().unwrap_or("unknown"),
            problem = question["problem_statement"].as_str().unwrap_or(""),
            time = question["time_complexity"].as_str().unwrap_or("unknown"),
            space = question["space_complexity"].as_str().unwrap_or("unknown"),
        )
    }

    pub fn system_design_question(difficulty: Difficulty, skill_profile: Option<&Value>) -> String {
        let profile = skill_profile
            .map(|p| serde_json::to_string_pretty(p).unwrap_or_default())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "Generate a system design interview question for a candidate at {difficulty} \
             level.\n\nCandidate's skill profile:\n{profile}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"title\": \"Design a URL Shortener\",\n\
                 \"problem_statement\": \"...\",\n\
                 \"requirements\": [\"...\"],\n\
                 \"evaluation_criteria\": [\"Database design\", \"Scalability\", \"Caching\"]\n\
             }}"
        )
    }

    pub fn system_design_evaluation(question: &Value, answer: &str) -> String {
        format!(
            "Evaluate this system design proposal.\n\n\
             Question: {title}\n\
             Evaluation criteria: {criteria}\n\n\
             Candidate's proposal:\n{answer}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"overall_score\": 7,\n\
                 \"covered_criteria\": [\"...\"],\n\
                 \"missed_criteria\": [\"...\"],\n\
                 \"scalability_concerns\": [\"...\"],\n\
                 \"feedback\": \"...\"\n\
             }}",
            title = question["title"].as_str().unwrap_or("unknown"),
            criteria = question["evaluation_criteria"].to_string(),
        )
    }

    pub fn behavioral_question(difficulty: Difficulty, gaps: &[String]) -> String {
        format!(
            "Generate a behavioral interview question for a {difficulty} level candidate. \
             Probe one of: handling technical challenges, working under pressure, \
             collaboration and conflict, learning from mistakes, leadership.\n\n\
             Candidate's skill gaps: {gaps:?}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"question\": \"Tell me about a time...\",\n\
                 \"follow_ups\": [\"...\"],\n\
                 \"evaluation_focus\": [\"...\"]\n\
             }}"
        )
    }

    pub fn behavioral_evaluation(question: &Value, answer: &str) -> String {
        format!(
            "Evaluate this behavioral answer using the STAR method.\n\n\
             Question: {question}\n\n\
             Candidate's answer:\n{answer}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"overall_score\": 7,\n\
                 \"star_coverage\": {{\"situation\": true, \"task\": true, \"action\": true, \"result\": false}},\n\
                 \"red_flags\": [],\n\
                 \"feedback\": \"...\"\n\
             }}",
            question = question["question"].as_str().unwrap_or("unknown"),
        )
    }

    pub fn critique(scores: &Value, recent_evaluations: &[String]) -> String {
        let evaluations = if recent_evaluations.is_empty() {
            "No evaluations yet".to_string()
        } else {
            recent_evaluations.join("\n")
        };
        format!(
            "You are reviewing these evaluation scores and feedback as a critic.\n\n\
             Current scores: {scores}\n\n\
             Recent evaluations:\n{evaluations}\n\n\
             Challenge the scores if needed. Respond ONLY with valid JSON:\n\
             {{\n\
                 \"agrees_with_scores\": false,\n\
                 \"key_concerns\": [\"...\"],\n\
                 \"positive_observations\": [\"...\"],\n\
                 \"recommendation_influence\": \"lean_no_hire\",\n\
                 \"debate_argument\": \"...\"\n\
             }}"
        )
    }

    pub fn fact_check(answers: &[String], evaluations: &[String]) -> String {
        let answers_text: String = answers
            .iter()
            .enumerate()
            .map(|(i, a)| format!("Answer {}: {}\n", i + 1, truncate(a, 500)))
            .collect();
        format!(
            "Review these evaluations for factual accuracy against what the candidate \
             actually said.\n\n\
             Candidate's recent answers:\n{answers_text}\n\
             Recent evaluations:\n{evaluations}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"hallucinations_detected\": false,\n\
                 \"flagged_claims\": [],\n\
                 \"unsupported_praise\": [],\n\
                 \"unsupported_criticism\": [],\n\
                 \"accuracy_score\": 9,\n\
                 \"validation_summary\": \"...\"\n\
             }}",
            evaluations = evaluations.join("\n"),
        )
    }

    pub fn final_decision(
        candidate_name: &str,
        difficulty: Difficulty,
        skill_profile: Option<&Value>,
        scores: &Value,
        evaluations: &[String],
    ) -> String {
        let profile = skill_profile
            .map(|p| serde_json::to_string_pretty(p).unwrap_or_default())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "Make the final hiring decision based on all data.\n\n\
             Candidate: {candidate_name}\n\
             Difficulty level: {difficulty}\n\
             Skill profile:\n{profile}\n\n\
             All scores: {scores}\n\n\
             Interview evaluations:\n{evaluations}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\n\
                 \"recommendation\": \"hire\",\n\
                 \"confidence\": 0.78,\n\
                 \"overall_score\": 7.5,\n\
                 \"strengths\": [\"...\"],\n\
                 \"concerns\": [\"...\"],\n\
                 \"detailed_feedback\": \"...\"\n\
             }}",
            evaluations = evaluations.join("\n"),
        )
    }
}

/// Truncate on a char boundary; answers can be arbitrarily long.
pub fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_role_has_a_system_prompt() {
        for role in [
            AgentRole::Recruiter,
            AgentRole::DsaInterviewer,
            AgentRole::CodeEvaluator,
            AgentRole::SystemDesign,
            AgentRole::Behavioral,
            AgentRole::Critic,
            AgentRole::FactChecker,
            AgentRole::FinalDecision,
        ] {
            assert!(!RolePrompts::system(role).is_empty());
        }
    }

    #[test]
    fn test_resume_analysis_embeds_resume() {
        let prompt = RolePrompts::resume_analysis("Built a RAG pipeline in Rust");
        assert!(prompt.contains("Built a RAG pipeline in Rust"));
        assert!(prompt.contains("dsa_level"));
    }

    #[test]
    fn test_dsa_evaluation_embeds_question_and_answer() {
        let question = json!({
            "title": "Two Sum",
            "problem_statement": "Find indices...",
            "optimal_approach": "hash map"
        });
        let prompt = RolePrompts::dsa_evaluation(&question, "use a dict");
        assert!(prompt.contains("Two Sum"));
        assert!(prompt.contains("use a dict"));
        assert!(prompt.contains("hash map"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 5), "héllo");
        assert_eq!(truncate("short", 100), "short");
    }
}
