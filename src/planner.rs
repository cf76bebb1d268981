use crate::data::{RoomId, SeatingPlan};
use crate::error::SeatingError;
use crate::{solver, store};
use log::{info, warn};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;

/// A field that clients may send either as a single value or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<Value>),
    One(Value),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    fn into_vec(self) -> Vec<Value> {
        match self {
            OneOrMany::Many(values) => values,
            OneOrMany::One(Value::Null) => Vec::new(),
            OneOrMany::One(value) => vec![value],
        }
    }
}

/// Body of a plan generation request: room ids in fill order and semester (batch) titles.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub selected_rooms: OneOrMany,
    #[serde(default)]
    pub selected_batches: OneOrMany,
}

impl PlanRequest {
    /// Room ids given as numbers or numeric strings; anything else is dropped.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.selected_rooms
            .clone()
            .into_vec()
            .into_iter()
            .filter_map(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect()
    }

    /// Batch titles, trimmed, with blanks dropped.
    pub fn batch_titles(&self) -> Vec<String> {
        self.selected_batches
            .clone()
            .into_vec()
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Resolves the selection, seats the students and stores the plan for the touched rooms.
pub fn generate_plan(
    conn: &mut Connection,
    request: &PlanRequest,
) -> Result<SeatingPlan, SeatingError> {
    let room_ids = request.room_ids();
    let titles = request.batch_titles();
    if room_ids.is_empty() {
        return Err(reject(SeatingError::InvalidSelection("No rooms selected.".to_string())));
    }
    if titles.is_empty() {
        return Err(reject(SeatingError::InvalidSelection("No batches selected.".to_string())));
    }

    let rooms = store::rooms_by_ids(conn, &room_ids)?;
    if rooms.is_empty() {
        return Err(reject(SeatingError::NotFound("Selected rooms not found.".to_string())));
    }

    let semester_ids = store::semester_ids_by_titles(conn, &titles)?;
    if semester_ids.is_empty() {
        return Err(reject(SeatingError::NotFound(
            "Selected semester batch titles do not exist.".to_string(),
        )));
    }

    let students = store::students_for_semesters(conn, &semester_ids)?;
    if students.is_empty() {
        return Err(reject(SeatingError::NotFound(
            "No students found for selected batches/semesters.".to_string(),
        )));
    }

    let plan = solver::solve(&rooms, &students).map_err(reject)?;
    store::replace_plan(conn, &plan)?;
    info!(
        "Stored seating plan for {} rooms ({} seats)",
        plan.plan.len(),
        plan.assigned_students
    );
    Ok(plan)
}

fn reject(err: SeatingError) -> SeatingError {
    warn!("Seating plan rejected ({}): {}", err.kind(), err);
    err
}
