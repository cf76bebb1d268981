use crate::data::{Room, RoomId, SeatingPlan, SeatingRow, Semester, SemesterId, Student};
use crate::error::SeatingError;
use log::{error, info};
use rusqlite::{Connection, Transaction, params, params_from_iter};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rooms (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    capacity INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS semesters (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY,
    full_name TEXT NOT NULL,
    roll_no TEXT NOT NULL,
    department TEXT,
    batch TEXT NOT NULL,
    semester_id INTEGER NOT NULL REFERENCES semesters(id)
);
CREATE TABLE IF NOT EXISTS seating_plan (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    room TEXT NOT NULL,
    seat_no TEXT NOT NULL,
    student TEXT NOT NULL,
    roll_no TEXT NOT NULL,
    department TEXT NOT NULL,
    batch TEXT NOT NULL,
    semester TEXT NOT NULL
);
";

/// Shared handle to the SQLite database.
///
/// All access goes through one connection behind a mutex, so plan generation and its write-back
/// never interleave with another run.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Opens (or creates) the database at `path`; `:memory:` gives a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SeatingError> {
        let path = path.as_ref();
        let conn = if path == Path::new(":memory:") {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        init_schema(&conn)?;
        info!("Opened seating database at {}", path.display());
        Ok(Store {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, SeatingError> {
        Self::open(":memory:")
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with_conn<R>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<R, SeatingError>,
    ) -> Result<R, SeatingError> {
        // open transactions roll back on unwind, so a poisoned connection is still consistent
        let mut conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *conn)
    }
}

pub fn init_schema(conn: &Connection) -> Result<(), SeatingError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn room_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
    let capacity: i64 = row.get(2)?;
    Ok(Room {
        id: row.get(0)?,
        name: row.get(1)?,
        capacity: u32::try_from(capacity.max(0)).unwrap_or(u32::MAX),
    })
}

pub fn list_rooms(conn: &Connection) -> Result<Vec<Room>, SeatingError> {
    let mut stmt = conn.prepare("SELECT id, name, capacity FROM rooms ORDER BY id")?;
    let rooms = stmt
        .query_map([], room_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rooms)
}

pub fn list_semesters(conn: &Connection) -> Result<Vec<Semester>, SeatingError> {
    let mut stmt = conn.prepare("SELECT id, title FROM semesters ORDER BY id")?;
    let semesters = stmt
        .query_map([], |row| {
            Ok(Semester {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(semesters)
}

/// Rooms with the given ids, ordered by id. Unknown ids are skipped.
pub fn rooms_by_ids(conn: &Connection, ids: &[RoomId]) -> Result<Vec<Room>, SeatingError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, name, capacity FROM rooms WHERE id IN ({}) ORDER BY id",
        placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rooms = stmt
        .query_map(params_from_iter(ids), room_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rooms)
}

pub fn semester_ids_by_titles(
    conn: &Connection,
    titles: &[String],
) -> Result<Vec<SemesterId>, SeatingError> {
    if titles.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id FROM semesters WHERE title IN ({}) ORDER BY id",
        placeholders(titles.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(params_from_iter(titles), |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Students of the given semesters, sorted by department label, batch and roll number.
pub fn students_for_semesters(
    conn: &Connection,
    semester_ids: &[SemesterId],
) -> Result<Vec<Student>, SeatingError> {
    if semester_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT s.id, s.full_name, s.roll_no, s.department, s.batch, sem.title
         FROM students s
         JOIN semesters sem ON s.semester_id = sem.id
         WHERE s.semester_id IN ({})
         ORDER BY s.department, s.batch, s.roll_no, s.id",
        placeholders(semester_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut students = stmt
        .query_map(params_from_iter(semester_ids), |row| {
            Ok(Student {
                id: row.get(0)?,
                name: row.get(1)?,
                roll_no: row.get(2)?,
                department: row.get(3)?,
                batch: row.get(4)?,
                semester: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<Student>, _>>()?;

    // queue order follows the department label, which trims names and folds blanks to UNKNOWN
    students.sort_by(|a, b| {
        (a.department_label(), &a.batch, &a.roll_no)
            .cmp(&(b.department_label(), &b.batch, &b.roll_no))
    });
    Ok(students)
}

/// Replaces the stored seats of every room in `plan` with the plan's seats.
///
/// Runs in one transaction. Rooms not in the plan are untouched; on any error nothing changes.
pub fn replace_plan(conn: &mut Connection, plan: &SeatingPlan) -> Result<(), SeatingError> {
    let result = conn.transaction().and_then(|tx| {
        write_plan(&tx, plan)?;
        tx.commit()
    });
    result.map_err(|e| {
        error!("Persist error: {e}");
        SeatingError::PersistenceFailure(e)
    })
}

fn write_plan(tx: &Transaction<'_>, plan: &SeatingPlan) -> rusqlite::Result<()> {
    let rooms: Vec<&str> = plan.plan.iter().map(|r| r.room.as_str()).collect();
    if !rooms.is_empty() {
        let sql = format!(
            "DELETE FROM seating_plan WHERE room IN ({})",
            placeholders(rooms.len())
        );
        tx.execute(&sql, params_from_iter(&rooms))?;
    }

    let mut insert = tx.prepare(
        "INSERT INTO seating_plan (room, seat_no, student, roll_no, department, batch, semester)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for room in &plan.plan {
        for seat in &room.seats {
            insert.execute(params![
                room.room,
                seat.seat_no.to_string(),
                seat.student,
                seat.roll_no,
                seat.department,
                seat.batch,
                seat.semester,
            ])?;
        }
    }
    Ok(())
}

/// Every stored seat, by room name then numeric seat number.
pub fn seating_rows(conn: &Connection) -> Result<Vec<SeatingRow>, SeatingError> {
    let mut stmt = conn.prepare(
        "SELECT id, room, seat_no, student, roll_no, department, batch, semester
         FROM seating_plan
         ORDER BY room, CAST(seat_no AS INTEGER)",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SeatingRow {
                id: row.get(0)?,
                room: row.get(1)?,
                seat_no: row.get(2)?,
                student: row.get(3)?,
                roll_no: row.get(4)?,
                department: row.get(5)?,
                batch: row.get(6)?,
                semester: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_room(conn: &Connection, name: &str, capacity: i64) -> Result<RoomId, SeatingError> {
    conn.execute(
        "INSERT INTO rooms (name, capacity) VALUES (?1, ?2)",
        params![name, capacity],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_semester(conn: &Connection, title: &str) -> Result<SemesterId, SeatingError> {
    conn.execute("INSERT INTO semesters (title) VALUES (?1)", params![title])?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_student(
    conn: &Connection,
    full_name: &str,
    roll_no: &str,
    department: Option<&str>,
    batch: &str,
    semester_id: SemesterId,
) -> Result<i64, SeatingError> {
    conn.execute(
        "INSERT INTO students (full_name, roll_no, department, batch, semester_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![full_name, roll_no, department, batch, semester_id],
    )?;
    Ok(conn.last_insert_rowid())
}
