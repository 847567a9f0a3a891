use serde::{Deserialize, Serialize};

// The field names follow the JSON documents exported by the browser tool,
// hence the camelCase renames. Fields the pipeline does not consume
// (hypotheses, per-participant time estimates) are simply ignored.

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StudyFileItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "estimatedTime")]
    pub estimated_time: u32,
    pub description: Option<String>,
    #[serde(default)]
    pub checklist: Vec<String>,
    pub link: Option<String>,
    #[serde(rename = "isCondition")]
    pub is_condition: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StudyFileVariable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub levels: Vec<String>,
    pub balancing: String,
    pub design: String,
    pub description: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StudyFileMeasure {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(rename = "meansOfMeasure")]
    pub means_of_measure: Option<String>,
    pub description: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StudyFile {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "participantsNeeded", default)]
    pub participants_needed: usize,
    #[serde(rename = "participantsDone", default)]
    pub participants_done: usize,
    #[serde(rename = "procedurePlan", default)]
    pub procedure_plan: Vec<StudyFileItem>,
    #[serde(rename = "IV", default)]
    pub independent_variables: Vec<StudyFileVariable>,
    #[serde(rename = "DV", default)]
    pub dependent_variables: Vec<StudyFileMeasure>,
}
