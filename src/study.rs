use log::{debug, info, warn};

use counterbalance::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::study::config_reader::*;

pub mod config_reader;

#[derive(Debug, Snafu)]
pub enum StudyError {
    #[snafu(display("Error opening study file {path}"))]
    OpeningStudy {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type StudyResult<T> = Result<T, StudyError>;

fn validate_balancing(s: &str) -> StudyResult<Balancing> {
    match s {
        "none" => Ok(Balancing::NoBalancing),
        "latin" => Ok(Balancing::Latin),
        "balanced" => Ok(Balancing::Balanced),
        "complete" => Ok(Balancing::Complete),
        x => whatever!("unknown balancing strategy: {}", x),
    }
}

fn validate_design(s: &str) -> StudyResult<Design> {
    match s {
        "within" => Ok(Design::Within),
        "between" => Ok(Design::Between),
        x => whatever!("unknown design: {}", x),
    }
}

fn validate_status(s: &str) -> StudyResult<StudyStatus> {
    match s {
        "preparation" => Ok(StudyStatus::Preparation),
        "pilot" => Ok(StudyStatus::Pilot),
        "conduct" => Ok(StudyStatus::Conduct),
        "done" => Ok(StudyStatus::Done),
        x => whatever!("unknown study status: {}", x),
    }
}

/// Turns the raw study file into the core study record. String-typed enum
/// fields are checked strictly: an unknown value is an error, never a
/// silent default.
fn validate_study(file: &StudyFile) -> StudyResult<Study> {
    let mut variables: Vec<IndependentVariable> = Vec::new();
    for v in file.independent_variables.iter() {
        variables.push(IndependentVariable {
            id: v.id.clone(),
            name: v.name.clone(),
            levels: v.levels.clone(),
            balancing: validate_balancing(v.balancing.as_str())?,
            design: validate_design(v.design.as_str())?,
            description: v.description.clone(),
        });
    }
    let measures: Vec<DependentVariable> = file
        .dependent_variables
        .iter()
        .map(|m| DependentVariable {
            id: m.id.clone(),
            name: m.name.clone(),
            measures: m.measures.clone(),
            means_of_measure: m.means_of_measure.clone(),
            description: m.description.clone(),
        })
        .collect();
    let plan: Vec<ProcedurePlanItem> = file
        .procedure_plan
        .iter()
        .map(|item| ProcedurePlanItem {
            id: item.id.clone(),
            title: item.title.clone(),
            estimated_time: item.estimated_time,
            description: item.description.clone(),
            checklist: item.checklist.clone(),
            link: item.link.clone(),
            is_condition: item.is_condition,
        })
        .collect();
    Ok(Study {
        id: file.id.clone(),
        name: file.name.clone(),
        status: validate_status(file.status.as_str())?,
        participants_needed: file.participants_needed,
        participants_done: file.participants_done,
        procedure_plan: plan,
        independent_variables: variables,
        dependent_variables: measures,
    })
}

fn assignment_to_json(participant: usize, run: &RunAssignment) -> JSValue {
    let mut conditions: JSMap<String, JSValue> = JSMap::new();
    for (name, sequence) in run.conditions.iter() {
        conditions.insert(name.clone(), json!(sequence));
    }
    json!({
        "participant": participant,
        "sessionId": run.session_id,
        "conditions": conditions
    })
}

fn build_summary_js(study: &Study, runs: &[(usize, RunAssignment)]) -> JSValue {
    let assignments: Vec<JSValue> = runs
        .iter()
        .map(|(participant, run)| assignment_to_json(*participant, run))
        .collect();
    json!({
        "study": study.name,
        "conditionSets": required_condition_sets(&study.independent_variables),
        "participantsNeeded": study.participants_needed,
        "totalTime": study.total_time(),
        "assignments": assignments
    })
}

/// Runs the full pipeline over a parsed study file: validation, plan
/// reconciliation, and one assignment per participant.
pub fn run_study_config(file: &StudyFile, participants: Option<u32>) -> StudyResult<JSValue> {
    let mut study = validate_study(file)?;
    info!(
        "study: {:?}, {} variable(s), {} plan step(s)",
        study.name,
        study.independent_variables.len(),
        study.procedure_plan.len()
    );

    // The stored counters may be stale; both are derived from the variables.
    study.procedure_plan = reconcile_plan(&study.procedure_plan, &study.independent_variables);
    study.participants_needed = participants_needed(&study.independent_variables);
    debug!(
        "run_study_config: reconciled plan has {} step(s), {} needed participant(s)",
        study.procedure_plan.len(),
        study.participants_needed
    );

    let count = match participants {
        Some(x) => x as usize,
        None => std::cmp::max(study.participants_needed, 1),
    };
    let mut runs: Vec<(usize, RunAssignment)> = Vec::new();
    for participant in 0..count {
        let run = match generate_run(&study, participant) {
            Ok(x) => x,
            Err(e) => whatever!("Assignment error for participant {}: {:?}", participant, e),
        };
        runs.push((participant, run));
    }
    Ok(build_summary_js(&study, &runs))
}

fn read_reference(path: String) -> StudyResult<JSValue> {
    let contents =
        fs::read_to_string(path.clone()).context(OpeningReferenceSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_study(
    config_path: String,
    participants: Option<u32>,
    out_path: Option<String>,
    check_reference_path: Option<String>,
) -> StudyResult<()> {
    let config_str = fs::read_to_string(config_path.clone()).context(OpeningStudySnafu {
        path: config_path.clone(),
    })?;
    let file: StudyFile = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", file);

    let summary_js = run_study_config(&file, participants)?;
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    match out_path {
        Some(path) if path != "stdout" => {
            fs::write(path.clone(), &pretty_js_summary).context(WritingSummarySnafu { path })?;
        }
        _ => {
            println!("{}", pretty_js_summary);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(reference_p) = check_reference_path {
        let reference = read_reference(reference_p)?;
        info!("reference: {:?}", reference);
        let pretty_js_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_js_reference != pretty_js_summary {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_reference.as_str(),
                pretty_js_summary.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_study_json() -> String {
        json!({
            "id": "V1StGXR",
            "name": "Menu layout study",
            "status": "preparation",
            "participantsNeeded": 0,
            "participantsDone": 0,
            "estimatedTimePerParticipant": 30,
            "procedurePlan": [
                {
                    "id": "a1",
                    "title": "Welcome",
                    "estimatedTime": 5,
                    "checklist": ["Greet the participant", "Hand out consent form"],
                    "isCondition": 0
                }
            ],
            "IV": [
                {
                    "id": "b2",
                    "name": "layout",
                    "levels": ["list", "grid"],
                    "balancing": "balanced",
                    "design": "within"
                },
                {
                    "id": "b3",
                    "name": "expertise",
                    "levels": ["novice", "expert"],
                    "balancing": "none",
                    "design": "between"
                }
            ],
            "DV": [
                { "id": "c4", "name": "task time", "measures": ["seconds"] }
            ],
            "hypotheses": []
        })
        .to_string()
    }

    #[test]
    fn parse_and_validate_study_file() {
        let file: StudyFile = serde_json::from_str(&demo_study_json()).unwrap();
        assert_eq!(file.name, "Menu layout study");
        assert_eq!(file.independent_variables.len(), 2);
        let study = validate_study(&file).unwrap();
        assert_eq!(study.status, StudyStatus::Preparation);
        assert_eq!(study.independent_variables[0].balancing, Balancing::Balanced);
        assert_eq!(study.independent_variables[0].design, Design::Within);
        assert_eq!(study.independent_variables[1].design, Design::Between);
        assert_eq!(study.dependent_variables[0].measures, vec!["seconds"]);
    }

    #[test]
    fn unknown_balancing_is_rejected() {
        let mut js: JSValue = serde_json::from_str(&demo_study_json()).unwrap();
        js["IV"][0]["balancing"] = json!("shuffled");
        let file: StudyFile = serde_json::from_value(js).unwrap();
        let res = validate_study(&file);
        assert!(res.is_err());
        let msg = format!("{}", res.unwrap_err());
        assert!(msg.contains("unknown balancing strategy"), "{}", msg);
    }

    #[test]
    fn unknown_design_is_rejected() {
        let mut js: JSValue = serde_json::from_str(&demo_study_json()).unwrap();
        js["IV"][1]["design"] = json!("mixed");
        let file: StudyFile = serde_json::from_value(js).unwrap();
        assert!(validate_study(&file).is_err());
    }

    #[test]
    fn summary_covers_one_counterbalancing_block() {
        let file: StudyFile = serde_json::from_str(&demo_study_json()).unwrap();
        let summary = run_study_config(&file, None).unwrap();

        // 2 layout levels -> 2 condition slots; 2x2 participants needed.
        assert_eq!(summary["conditionSets"], json!(2));
        assert_eq!(summary["participantsNeeded"], json!(4));
        // The welcome step plus two appended zero-length condition slots.
        assert_eq!(summary["totalTime"], json!(5));

        let assignments = summary["assignments"].as_array().unwrap();
        assert_eq!(assignments.len(), 4);
        assert_eq!(assignments[0]["participant"], json!(0));
        assert_eq!(
            assignments[0]["conditions"]["layout"],
            json!(["list", "grid"])
        );
        // One repeated value per plan step for the between variable.
        assert_eq!(
            assignments[0]["conditions"]["expertise"],
            json!(["novice", "novice", "novice"])
        );
        assert_eq!(
            assignments[1]["conditions"]["expertise"],
            json!(["expert", "expert", "expert"])
        );
        // The balanced square alternates the starting level.
        assert_eq!(
            assignments[1]["conditions"]["layout"],
            json!(["grid", "list"])
        );

        let sid = assignments[0]["sessionId"].as_str().unwrap();
        assert_eq!(sid.len(), 3);
        assert!(sid.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn explicit_participant_count_overrides_the_default() {
        let file: StudyFile = serde_json::from_str(&demo_study_json()).unwrap();
        let summary = run_study_config(&file, Some(2)).unwrap();
        assert_eq!(summary["assignments"].as_array().unwrap().len(), 2);
    }
}
