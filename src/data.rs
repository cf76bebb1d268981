use serde::{Deserialize, Serialize};

// Type aliases for clarity
pub type RoomId = i64;
pub type StudentId = i64;
pub type SemesterId = i64;

/// Department label used for students whose department is missing or blank.
pub const UNKNOWN_DEPARTMENT: &str = "UNKNOWN";

/// Represents a physical exam room with a given seat capacity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

impl Room {
    /// Number of two-seat benches in the room.
    pub fn benches(&self) -> u32 {
        self.capacity / 2
    }

    /// Whether the room ends with one unpaired seat.
    pub fn has_single_seat(&self) -> bool {
        self.capacity % 2 == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Semester {
    pub id: SemesterId,
    pub title: String,
}

/// A student waiting to be seated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub roll_no: String,
    pub department: Option<String>,
    pub batch: String,
    pub semester: String,
}

impl Student {
    /// The department this student is queued under.
    pub fn department_label(&self) -> &str {
        match self.department.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d,
            _ => UNKNOWN_DEPARTMENT,
        }
    }
}

/// A single occupied seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub seat_no: u32,
    pub student: String,
    pub roll_no: String,
    pub department: String,
    pub batch: String,
    pub semester: String,
}

impl Seat {
    pub fn new(seat_no: u32, student: &Student) -> Self {
        Seat {
            seat_no,
            student: student.name.clone(),
            roll_no: student.roll_no.clone(),
            department: student.department_label().to_string(),
            batch: student.batch.clone(),
            semester: student.semester.clone(),
        }
    }
}

/// The seats assigned within one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPlan {
    pub room: String,
    pub room_id: RoomId,
    pub seats: Vec<Seat>,
}

/// The final output of the seat allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingPlan {
    pub total_students_available: usize,
    pub assigned_students: usize,
    pub plan: Vec<RoomPlan>,
}

/// A persisted seating row as stored in `seating_plan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingRow {
    pub id: i64,
    pub room: String,
    pub seat_no: String,
    pub student: String,
    pub roll_no: String,
    pub department: String,
    pub batch: String,
    pub semester: String,
}
