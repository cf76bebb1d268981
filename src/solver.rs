use crate::data::{Room, RoomPlan, Seat, SeatingPlan, Student};
use crate::error::SeatingError;
use crate::pool::DepartmentPool;
use log::{info, trace};
use std::time::Instant;

/// Seats `students` across `rooms` so that no bench holds two students of the same department.
///
/// Rooms are filled in the order given. Each bench takes one student from the largest remaining
/// department and one from the largest remaining *other* department. Filling stops as soon as
/// every student is seated; rooms after that point are left out of the plan. The very last student
/// may end up alone on a bench, which is never a diversity violation.
///
/// `students` should already be sorted by department, batch and roll number so that repeated
/// runs draw students in the same order.
pub fn solve(rooms: &[Room], students: &[Student]) -> Result<SeatingPlan, SeatingError> {
    let start_time = Instant::now();

    if rooms.is_empty() {
        return Err(SeatingError::InvalidSelection("No rooms selected.".to_string()));
    }
    if students.is_empty() {
        return Err(SeatingError::InvalidSelection(
            "No students found for the selection.".to_string(),
        ));
    }

    let mut pool = DepartmentPool::build(students);
    let departments: Vec<&str> = pool.departments().collect();
    if departments.len() < 2 {
        return Err(SeatingError::HomogeneousSelection {
            departments: departments.into_iter().map(str::to_string).collect(),
        });
    }
    info!(
        "Seating {} students from {} departments across {} rooms...",
        pool.initial_count(),
        departments.len(),
        rooms.len()
    );

    let mut plan = Vec::new();
    let mut assigned = 0;

    for room in rooms {
        let seats = fill_room(room, &mut pool)?;
        trace!("Room {:?}: {} seats assigned", room.name, seats.len());
        assigned += seats.len();
        plan.push(RoomPlan {
            room: room.name.clone(),
            room_id: room.id,
            seats,
        });

        if pool.remaining_count() == 0 {
            break;
        }
    }

    if assigned == 0 {
        return Err(SeatingError::NoSeatsAssigned);
    }

    info!(
        "Assigned {} of {} students in {} rooms in {:.2?}",
        assigned,
        pool.initial_count(),
        plan.len(),
        start_time.elapsed()
    );

    Ok(SeatingPlan {
        total_students_available: pool.initial_count(),
        assigned_students: assigned,
        plan,
    })
}

fn fill_room(room: &Room, pool: &mut DepartmentPool) -> Result<Vec<Seat>, SeatingError> {
    let mut seats = Vec::with_capacity((room.capacity as usize).min(pool.remaining_count()));
    let mut seat_no = 1;

    for _ in 0..room.benches() {
        let Some(first) = pool.largest().map(str::to_string) else {
            // everyone is seated
            return Ok(seats);
        };
        let s1 = pool.draw(&first);

        if pool.remaining_count() == 0 {
            // last student in the pool has nobody to share the bench with
            seats.push(Seat::new(seat_no, &s1));
            return Ok(seats);
        }

        let Some(second) = pool.largest_excluding(&first).map(str::to_string) else {
            return Err(SeatingError::UnpairableDepartment {
                room: room.name.clone(),
                department: first,
                remaining: pool.remaining_by_department(),
            });
        };
        let s2 = pool.draw(&second);
        trace!(
            "{}: bench {}-{} pairs {} with {}",
            room.name,
            seat_no,
            seat_no + 1,
            first,
            second
        );

        seats.push(Seat::new(seat_no, &s1));
        seats.push(Seat::new(seat_no + 1, &s2));
        seat_no += 2;
    }

    if room.has_single_seat() {
        if let Some(dept) = pool.largest().map(str::to_string) {
            let s = pool.draw(&dept);
            seats.push(Seat::new(seat_no, &s));
        }
    }

    Ok(seats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn room(id: i64, capacity: u32) -> Room {
        Room {
            id,
            name: format!("Room {id}"),
            capacity,
        }
    }

    /// Builds students sorted by department, numbering roll numbers per department.
    fn students(counts: &[(&str, usize)]) -> Vec<Student> {
        let mut out = Vec::new();
        let mut sorted = counts.to_vec();
        sorted.sort();
        for (dept, n) in sorted {
            for i in 0..n {
                out.push(Student {
                    id: out.len() as i64 + 1,
                    name: format!("{dept} student {i}"),
                    roll_no: format!("{dept}-{i:03}"),
                    department: Some(dept.to_string()),
                    batch: format!("{dept}-24"),
                    semester: "Spring".to_string(),
                });
            }
        }
        out
    }

    fn assert_benches_mixed(plan: &SeatingPlan) {
        for room in &plan.plan {
            for bench in room.seats.chunks(2) {
                if let [a, b] = bench {
                    assert_eq!(a.seat_no % 2, 1);
                    assert_eq!(b.seat_no, a.seat_no + 1);
                    assert_ne!(a.department, b.department, "same department on a bench in {}", room.room);
                }
            }
        }
    }

    #[test]
    fn even_departments_fill_one_room() {
        let plan = solve(&[room(1, 6)], &students(&[("X", 3), ("Y", 3)])).unwrap();

        assert_eq!(plan.plan.len(), 1);
        assert_eq!(plan.assigned_students, 6);
        assert_eq!(plan.total_students_available, 6);
        let depts: Vec<&str> = plan.plan[0].seats.iter().map(|s| s.department.as_str()).collect();
        assert_eq!(depts, vec!["X", "Y", "X", "Y", "X", "Y"]);
        assert_benches_mixed(&plan);
    }

    #[test]
    fn lopsided_departments_fail_with_remaining_counts() {
        let err = solve(&[room(1, 10)], &students(&[("X", 5), ("Y", 1)])).unwrap_err();

        match err {
            SeatingError::UnpairableDepartment {
                room,
                department,
                remaining,
            } => {
                assert_eq!(room, "Room 1");
                assert_eq!(department, "X");
                let expected: BTreeMap<String, usize> =
                    [("X".to_string(), 3), ("Y".to_string(), 0)].into_iter().collect();
                assert_eq!(remaining, expected);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn leftover_student_takes_seat_three() {
        let plan = solve(&[room(1, 5)], &students(&[("X", 2), ("Y", 1)])).unwrap();

        let seats = &plan.plan[0].seats;
        let numbers: Vec<u32> = seats.iter().map(|s| s.seat_no).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(seats[2].department, "X");
        assert_eq!(plan.assigned_students, 3);
    }

    #[test]
    fn odd_capacity_seats_one_trailing_student() {
        let plan = solve(&[room(1, 3)], &students(&[("X", 3), ("Y", 1)])).unwrap();

        let depts: Vec<&str> = plan.plan[0].seats.iter().map(|s| s.department.as_str()).collect();
        assert_eq!(depts, vec!["X", "Y", "X"]);
        assert_eq!(plan.total_students_available, 4);
        assert_eq!(plan.assigned_students, 3);
    }

    #[test]
    fn last_student_sits_alone_on_an_even_room_bench() {
        let plan = solve(&[room(1, 4)], &students(&[("X", 2), ("Y", 1)])).unwrap();

        let depts: Vec<&str> = plan.plan[0].seats.iter().map(|s| s.department.as_str()).collect();
        assert_eq!(depts, vec!["X", "Y", "X"]);
        assert_eq!(plan.assigned_students, 3);
    }

    #[test]
    fn later_rooms_are_omitted_once_everyone_is_seated() {
        let plan = solve(&[room(1, 4), room(2, 100)], &students(&[("X", 2), ("Y", 2)])).unwrap();

        assert_eq!(plan.plan.len(), 1);
        assert_eq!(plan.plan[0].room_id, 1);
        assert_eq!(plan.plan[0].seats.len(), 4);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let err = solve(&[], &students(&[("X", 1), ("Y", 1)])).unwrap_err();
        assert!(matches!(err, SeatingError::InvalidSelection(_)));

        let err = solve(&[room(1, 4)], &[]).unwrap_err();
        assert!(matches!(err, SeatingError::InvalidSelection(_)));
    }

    #[test]
    fn single_department_is_homogeneous() {
        let err = solve(&[room(1, 40)], &students(&[("CS", 12)])).unwrap_err();

        match err {
            SeatingError::HomogeneousSelection { departments } => {
                assert_eq!(departments, vec!["CS".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_capacity_rooms_yield_no_seats() {
        let err = solve(&[room(1, 0), room(2, 0)], &students(&[("X", 2), ("Y", 2)])).unwrap_err();
        assert!(matches!(err, SeatingError::NoSeatsAssigned));
    }

    #[test]
    fn zero_capacity_room_is_kept_empty_in_plan() {
        let plan = solve(&[room(1, 0), room(2, 4)], &students(&[("X", 2), ("Y", 2)])).unwrap();

        assert_eq!(plan.plan.len(), 2);
        assert!(plan.plan[0].seats.is_empty());
        assert_eq!(plan.plan[1].seats.len(), 4);
    }

    #[test]
    fn huge_room_only_reserves_what_it_seats() {
        let plan = solve(&[room(1, u32::MAX)], &students(&[("X", 1), ("Y", 1)])).unwrap();

        assert_eq!(plan.plan.len(), 1);
        assert_eq!(plan.plan[0].seats.len(), 2);
        assert_eq!(plan.assigned_students, 2);
    }

    #[test]
    fn capacity_one_room_takes_a_single_student() {
        let plan = solve(&[room(1, 1), room(2, 2)], &students(&[("X", 2), ("Y", 1)])).unwrap();

        assert_eq!(plan.plan[0].seats.len(), 1);
        assert_eq!(plan.plan[0].seats[0].department, "X");
        assert_eq!(plan.plan[1].seats.len(), 2);
        assert_eq!(plan.assigned_students, 3);
    }

    #[test]
    fn many_departments_are_all_seated_and_mixed() {
        let rooms = vec![room(1, 25), room(2, 31), room(3, 40)];
        let input = students(&[("AI", 30), ("CE", 28), ("CS", 25), ("EE", 5)]);
        let plan = solve(&rooms, &input).unwrap();

        assert_eq!(plan.assigned_students, input.len());
        let seated: usize = plan.plan.iter().map(|r| r.seats.len()).sum();
        assert_eq!(seated, plan.assigned_students);
        assert_benches_mixed(&plan);

        for (room_plan, room) in plan.plan.iter().zip(&rooms) {
            assert!(room_plan.seats.len() <= room.capacity as usize);
            let numbers: Vec<u32> = room_plan.seats.iter().map(|s| s.seat_no).collect();
            let expected: Vec<u32> = (1..=room_plan.seats.len() as u32).collect();
            assert_eq!(numbers, expected);
        }

        let mut rolls: Vec<&str> = plan
            .plan
            .iter()
            .flat_map(|r| r.seats.iter().map(|s| s.roll_no.as_str()))
            .collect();
        rolls.sort();
        rolls.dedup();
        assert_eq!(rolls.len(), input.len());
    }

    #[test]
    fn insufficient_capacity_seats_what_fits() {
        let plan = solve(&[room(1, 4)], &students(&[("X", 5), ("Y", 5)])).unwrap();

        assert_eq!(plan.total_students_available, 10);
        assert_eq!(plan.assigned_students, 4);
        assert_benches_mixed(&plan);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let rooms = vec![room(7, 11), room(3, 9)];
        let input = students(&[("Civil", 7), ("Computing", 6), ("Maths", 4)]);

        let first = serde_json::to_string(&solve(&rooms, &input).unwrap()).unwrap();
        let second = serde_json::to_string(&solve(&rooms, &input).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
