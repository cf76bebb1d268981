use crate::data::Student;
use itertools::Itertools;
use std::collections::{BTreeMap, VecDeque};

/// Pending students, queued per department in input order.
///
/// Departments are kept in a `BTreeMap` so iteration is in ascending name order, which is what
/// makes the "largest queue" choice a total order. Queues are never removed once they empty.
#[derive(Debug, Clone, Default)]
pub struct DepartmentPool {
    queues: BTreeMap<String, VecDeque<Student>>,
    initial: usize,
}

impl DepartmentPool {
    /// Groups students by department, keeping their relative order within each department.
    ///
    /// Callers are expected to pass students sorted by department, batch and roll number.
    pub fn build(students: &[Student]) -> Self {
        let queues = students
            .iter()
            .map(|s| (s.department_label().to_string(), s.clone()))
            .into_group_map()
            .into_iter()
            .map(|(dept, members)| (dept, VecDeque::from(members)))
            .collect();

        DepartmentPool {
            queues,
            initial: students.len(),
        }
    }

    /// Department with the most remaining students, ties going to the lowest name.
    pub fn largest(&self) -> Option<&str> {
        self.largest_where(|_| true)
    }

    /// Like [`largest`](Self::largest) but never returns `exclude`.
    pub fn largest_excluding(&self, exclude: &str) -> Option<&str> {
        self.largest_where(|dept| dept != exclude)
    }

    fn largest_where(&self, keep: impl Fn(&str) -> bool) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (dept, queue) in &self.queues {
            if queue.is_empty() || !keep(dept) {
                continue;
            }
            // strict comparison keeps the first (lowest) name on ties
            if best.is_none_or(|(_, len)| queue.len() > len) {
                best = Some((dept.as_str(), queue.len()));
            }
        }
        best.map(|(dept, _)| dept)
    }

    /// Removes the next student of `department`.
    ///
    /// # Panics
    ///
    /// Panics if the department has no remaining students. Callers pick departments through
    /// [`largest`](Self::largest) or [`largest_excluding`](Self::largest_excluding), which only
    /// return non-empty queues.
    pub fn draw(&mut self, department: &str) -> Student {
        self.queues
            .get_mut(department)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("draw from empty department queue {department:?}"))
    }

    pub fn remaining_count(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Students the pool started with.
    pub fn initial_count(&self) -> usize {
        self.initial
    }

    pub fn remaining_by_department(&self) -> BTreeMap<String, usize> {
        self.queues
            .iter()
            .map(|(dept, queue)| (dept.clone(), queue.len()))
            .collect()
    }

    /// Department names in ascending order, including exhausted ones.
    pub fn departments(&self) -> impl Iterator<Item = &str> {
        self.queues.keys().map(String::as_str)
    }
}
