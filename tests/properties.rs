//! Property tests: every accepted timetable satisfies the hard constraints.

use proptest::prelude::*;

use u_timetable::config::SchedulerConfig;
use u_timetable::models::{
    ClassGroup, ClockTime, Faculty, Problem, Room, RoomKind, SubjectKind, SubjectSpec, TimeGrid,
    Timetable, TimetableInput,
};
use u_timetable::scheduler::BacktrackingScheduler;
use u_timetable::TimetableError;

const MAX_SUBJECTS: usize = 3;

fn subject_name(class: usize, subject: usize, lab: bool) -> String {
    if lab {
        format!("C{class}S{subject} Lab")
    } else {
        format!("C{class}S{subject}")
    }
}

fn grid(lectures: usize, with_break: bool) -> TimeGrid {
    let mut grid = TimeGrid::new();
    let mut minute = 9 * 60;
    for i in 0..lectures {
        if with_break && i == 2 {
            grid = grid.with_break(ClockTime::from_minutes(minute), ClockTime::from_minutes(minute + 15));
            minute += 15;
        }
        grid = grid.with_lecture(ClockTime::from_minutes(minute), ClockTime::from_minutes(minute + 50));
        minute += 50;
    }
    grid
}

fn input_strategy() -> impl Strategy<Value = TimetableInput> {
    (
        2usize..=6,
        any::<bool>(),
        prop::collection::vec(
            prop::collection::vec((any::<bool>(), 1u32..=3), 1..=MAX_SUBJECTS),
            1..=3,
        ),
        prop::collection::vec(prop::collection::vec(any::<bool>(), 3 * MAX_SUBJECTS), 1..=3),
        prop::collection::vec(any::<bool>(), 1..=3),
    )
        .prop_map(|(lectures, with_break, curricula, capabilities, rooms)| {
            let mut input = TimetableInput::new(grid(lectures, with_break));
            for (c, subjects) in curricula.iter().enumerate() {
                let class_id = format!("C{c}");
                input = input.with_class(ClassGroup::new(class_id.clone()));
                for (s, &(lab, hours)) in subjects.iter().enumerate() {
                    let hours = if lab { hours * 2 } else { hours };
                    input = input.with_subject(class_id.clone(), SubjectSpec::new(subject_name(c, s, lab), hours));
                }
            }
            for (f, can) in capabilities.iter().enumerate() {
                let mut faculty = Faculty::new(format!("Prof {f}"), format!("P{f}"));
                for (c, subjects) in curricula.iter().enumerate() {
                    for (s, &(lab, _)) in subjects.iter().enumerate() {
                        if can[c * MAX_SUBJECTS + s] {
                            faculty = faculty.with_capability(subject_name(c, s, lab));
                        }
                    }
                }
                input = input.with_faculty(faculty);
            }
            for (r, &lab) in rooms.iter().enumerate() {
                input = input.with_room(if lab {
                    Room::lab(format!("LAB{r}"))
                } else {
                    Room::classroom(format!("R{r}"))
                });
            }
            input
        })
}

/// Checks the hard constraints directly on the assignments.
fn assert_hard_constraints(problem: &Problem, tt: &Timetable) {
    let all = tt.assignments();
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            if a.overlaps(b) {
                assert_ne!(a.faculty, b.faculty, "faculty double-booked: {a:?} {b:?}");
                assert_ne!(a.room, b.room, "room double-booked: {a:?} {b:?}");
                assert_ne!(a.class_id, b.class_id, "class double-booked: {a:?} {b:?}");
            }
        }

        let req = problem.requirement(&a.class_id, &a.subject).unwrap();
        let faculty = &problem.faculty()[problem.faculty_index(&a.faculty).unwrap()];
        let room = &problem.rooms()[problem.room_index(&a.room).unwrap()];
        assert!(faculty.can_teach(&a.subject), "{} cannot teach {}", a.faculty, a.subject);
        if req.kind == SubjectKind::Lab {
            assert_eq!(room.kind, RoomKind::Lab, "lab {} outside a lab room", a.subject);
        }
        assert_eq!(a.duration, req.duration);
        assert!(problem.layout().span_fits(a.start, a.duration));
    }

    for req in problem.requirements() {
        assert_eq!(tt.occurrences(&req.class_id, &req.subject), req.occurrences);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn accepted_timetables_satisfy_hard_constraints(input in input_strategy()) {
        let problem = Problem::new(input).unwrap();
        let config = SchedulerConfig::default()
            .with_max_backtracks(2_000)
            .with_time_limit_ms(500);
        match BacktrackingScheduler::new(config).solve(&problem) {
            Ok(tt) => assert_hard_constraints(&problem, &tt),
            Err(TimetableError::Infeasible(report)) | Err(TimetableError::BudgetExceeded(report)) => {
                prop_assert!(!report.unmet.is_empty());
                prop_assert!(report.best_placed <= report.total_required);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn identical_input_gives_identical_outcome(input in input_strategy()) {
        let problem = Problem::new(input).unwrap();
        let scheduler = BacktrackingScheduler::new(SchedulerConfig::default().with_max_backtracks(500));
        let a = scheduler.solve(&problem);
        let b = scheduler.solve(&problem);
        match (a, b) {
            (Ok(x), Ok(y)) => prop_assert_eq!(x, y),
            (Err(x), Err(y)) => prop_assert_eq!(x.report(), y.report()),
            (x, y) => prop_assert!(false, "outcomes differ: {x:?} vs {y:?}"),
        }
    }
}
