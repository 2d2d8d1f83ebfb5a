//! End-to-end scheduling scenarios.

use std::thread;
use std::time::{Duration, Instant};

use u_timetable::assembler::{FacultyView, SlotEntry, WeeklyTimetable};
use u_timetable::config::SchedulerConfig;
use u_timetable::constraints::verify;
use u_timetable::models::{
    Assignment, ClassGroup, ClockTime, Day, Faculty, Problem, Room, SlotRef, SubjectSpec,
    TimeGrid, Timetable, TimetableInput,
};
use u_timetable::scheduler::{BacktrackingScheduler, CancellationToken, TimetableKpi};
use u_timetable::{FailureCause, TimetableError};

fn t(s: &str) -> ClockTime {
    s.parse().unwrap()
}

fn sea_ml() -> TimetableInput {
    TimetableInput::new(TimeGrid::uniform(6))
        .with_class(ClassGroup::new("SEA"))
        .with_subject("SEA", SubjectSpec::new("ML", 3))
        .with_faculty(Faculty::new("Prof X", "PX").with_capability("ML"))
        .with_room(Room::classroom("R1"))
}

/// Two lectures, a break, two lectures.
fn split_grid() -> TimeGrid {
    TimeGrid::new()
        .with_lecture(t("09:00"), t("10:00"))
        .with_lecture(t("10:00"), t("11:00"))
        .with_break(t("11:00"), t("11:15"))
        .with_lecture(t("11:15"), t("12:15"))
        .with_lecture(t("12:15"), t("13:15"))
}

/// A class whose curriculum fills every slot of the week.
fn full_week() -> TimetableInput {
    TimetableInput::new(split_grid())
        .with_class(ClassGroup::new("SEA"))
        .with_subject("SEA", SubjectSpec::new("ML", 6))
        .with_subject("SEA", SubjectSpec::new("ML Lab", 4))
        .with_subject("SEA", SubjectSpec::new("DBMS", 6))
        .with_subject("SEA", SubjectSpec::new("CN", 4))
        .with_faculty(
            Faculty::new("Prof X", "PX")
                .with_capability("ML")
                .with_capability("CN"),
        )
        .with_faculty(
            Faculty::new("Prof Y", "PY")
                .with_capability("DBMS")
                .with_unavailable(SlotRef::new(Day::Monday, 0)),
        )
        .with_faculty(Faculty::new("Prof Z", "PZ").with_capability("ML Lab"))
        .with_room(Room::classroom("R1"))
        .with_room(Room::classroom("R2"))
        .with_room(Room::lab("LAB1"))
}

#[test]
fn test_single_class_scenario() {
    let problem = Problem::new(sea_ml()).unwrap();
    let tt = BacktrackingScheduler::default().solve(&problem).unwrap();

    assert_eq!(tt.len(), 3);
    assert!(tt.assignments().iter().all(|a| a.faculty == "PX" && a.room == "R1"));
    let mut slots: Vec<(Day, usize)> = tt.assignments().iter().map(|a| (a.day, a.start)).collect();
    slots.dedup();
    assert_eq!(slots.len(), 3);

    let weekly = WeeklyTimetable::assemble(&problem, &tt);
    let cells: Vec<&SlotEntry> = weekly.class("SEA").unwrap().values().flatten().map(|c| &c.entry).collect();
    assert_eq!(cells.len(), 30);
    assert_eq!(cells.iter().filter(|e| ***e == SlotEntry::Empty).count(), 27);
}

#[test]
fn test_lab_without_lab_room_is_infeasible() {
    let input = sea_ml()
        .with_subject("SEA", SubjectSpec::new("ML Lab", 2))
        .with_faculty(Faculty::new("Prof Y", "PY").with_capability("ML Lab"));
    match BacktrackingScheduler::default().schedule(input) {
        Err(TimetableError::Infeasible(report)) => {
            assert!(report.names("SEA", "ML Lab"));
            assert!(!report.names("SEA", "ML"));
        }
        other => panic!("expected infeasible, got {other:?}"),
    }
}

#[test]
fn test_shared_sole_faculty_is_not_accepted() {
    let input = TimetableInput::new(TimeGrid::uniform(1))
        .with_class(ClassGroup::new("SEA"))
        .with_class(ClassGroup::new("SEB"))
        .with_subject("SEA", SubjectSpec::new("ML", 5))
        .with_subject("SEB", SubjectSpec::new("AI", 5))
        .with_faculty(
            Faculty::new("Prof X", "PX")
                .with_capability("ML")
                .with_capability("AI"),
        )
        .with_room(Room::classroom("R1"))
        .with_room(Room::classroom("R2"));
    let err = BacktrackingScheduler::default().schedule(input).unwrap_err();
    assert!(matches!(
        err,
        TimetableError::Infeasible(_) | TimetableError::BudgetExceeded(_)
    ));
    let report = err.report().unwrap();
    assert!(report.names("SEA", "ML") || report.names("SEB", "AI"));
}

#[test]
fn test_zero_capable_faculty_is_infeasible_not_budget() {
    let input = sea_ml().with_subject("SEA", SubjectSpec::new("Compilers", 2));
    // Even a zero budget must not mask the proof
    let scheduler = BacktrackingScheduler::new(SchedulerConfig::default().with_max_backtracks(0));
    match scheduler.schedule(input) {
        Err(TimetableError::Infeasible(report)) => {
            assert_eq!(report.cause, FailureCause::Infeasible);
            assert!(report.names("SEA", "Compilers"));
            assert_eq!(report.unmet[0].shortfall(), 2);
        }
        other => panic!("expected infeasible, got {other:?}"),
    }
}

#[test]
fn test_completeness_on_full_week() {
    let problem = Problem::new(full_week()).unwrap();

    // A valid full assignment exists
    let hand = Timetable::new(vec![
        Assignment::new("SEA", Day::Monday, 0, 2, "ML Lab", "PZ", "LAB1"),
        Assignment::new("SEA", Day::Monday, 2, 1, "ML", "PX", "R1"),
        Assignment::new("SEA", Day::Monday, 3, 1, "DBMS", "PY", "R1"),
        Assignment::new("SEA", Day::Tuesday, 0, 2, "ML Lab", "PZ", "LAB1"),
        Assignment::new("SEA", Day::Tuesday, 2, 1, "ML", "PX", "R1"),
        Assignment::new("SEA", Day::Tuesday, 3, 1, "DBMS", "PY", "R1"),
        Assignment::new("SEA", Day::Wednesday, 0, 1, "ML", "PX", "R1"),
        Assignment::new("SEA", Day::Wednesday, 1, 1, "ML", "PX", "R1"),
        Assignment::new("SEA", Day::Wednesday, 2, 1, "DBMS", "PY", "R1"),
        Assignment::new("SEA", Day::Wednesday, 3, 1, "DBMS", "PY", "R1"),
        Assignment::new("SEA", Day::Thursday, 0, 1, "ML", "PX", "R1"),
        Assignment::new("SEA", Day::Thursday, 1, 1, "DBMS", "PY", "R1"),
        Assignment::new("SEA", Day::Thursday, 2, 1, "CN", "PX", "R1"),
        Assignment::new("SEA", Day::Thursday, 3, 1, "CN", "PX", "R1"),
        Assignment::new("SEA", Day::Friday, 0, 1, "ML", "PX", "R1"),
        Assignment::new("SEA", Day::Friday, 1, 1, "DBMS", "PY", "R1"),
        Assignment::new("SEA", Day::Friday, 2, 1, "CN", "PX", "R1"),
        Assignment::new("SEA", Day::Friday, 3, 1, "CN", "PX", "R1"),
    ]);
    assert!(verify(&problem, &hand).is_empty());

    let tt = BacktrackingScheduler::default().solve(&problem).unwrap();
    assert!(verify(&problem, &tt).is_empty());
    assert_eq!(tt.occurrences("SEA", "ML"), 6);
    assert_eq!(tt.occurrences("SEA", "ML Lab"), 2);
    assert_eq!(tt.occurrences("SEA", "DBMS"), 6);
    assert_eq!(tt.occurrences("SEA", "CN"), 4);

    let kpi = TimetableKpi::calculate(&problem, &tt);
    assert_eq!(kpi.empty_slots, 0);
    assert!((kpi.fill_rate - 1.0).abs() < 1e-10);
    assert!(tt
        .assignments()
        .iter()
        .filter(|a| a.subject == "ML Lab")
        .all(|a| a.start == 0 || a.start == 2));
}

#[test]
fn test_deterministic_results() {
    let scheduler = BacktrackingScheduler::default();
    let a = scheduler.schedule(full_week()).unwrap();
    let b = scheduler.schedule(full_week()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_more_resources_keep_feasibility() {
    let base = TimetableInput::new(TimeGrid::uniform(4))
        .with_class(ClassGroup::new("SEA"))
        .with_class(ClassGroup::new("SEB"))
        .with_subject("SEA", SubjectSpec::new("ML", 3))
        .with_subject("SEA", SubjectSpec::new("AI", 2))
        .with_subject("SEB", SubjectSpec::new("ML", 2))
        .with_subject("SEB", SubjectSpec::new("CN", 2))
        .with_faculty(
            Faculty::new("Prof X", "PX")
                .with_capability("ML")
                .with_capability("AI"),
        )
        .with_faculty(Faculty::new("Prof Y", "PY").with_capability("CN"))
        .with_room(Room::classroom("R1"));
    let scheduler = BacktrackingScheduler::default();
    assert!(scheduler.schedule(base.clone()).is_ok());

    let mut richer = base
        .with_faculty(
            Faculty::new("Prof Z", "PZ")
                .with_capability("ML")
                .with_capability("CN"),
        )
        .with_room(Room::classroom("R2"))
        .with_room(Room::lab("LAB1"));
    richer.faculty[1].capabilities.push("AI".into());
    let tt = scheduler.schedule(richer).unwrap();
    assert_eq!(tt.occurrences("SEA", "ML"), 3);
    assert_eq!(tt.occurrences("SEB", "CN"), 2);
}

/// Three classes need six lessons from two lecturers who only teach on
/// Monday and Tuesday. Many interchangeable rooms make the exhaustive
/// proof of infeasibility long.
fn overbooked_with_rooms(rooms: usize) -> TimetableInput {
    let mut px = Faculty::new("Prof X", "PX");
    let mut py = Faculty::new("Prof Y", "PY");
    for subject in ["ML", "AI", "CN"] {
        px = px.with_capability(subject);
        py = py.with_capability(subject);
    }
    for day in [Day::Wednesday, Day::Thursday, Day::Friday] {
        px = px.with_unavailable(SlotRef::new(day, 0));
        py = py.with_unavailable(SlotRef::new(day, 0));
    }
    let mut input = TimetableInput::new(TimeGrid::uniform(1))
        .with_class(ClassGroup::new("SEA"))
        .with_class(ClassGroup::new("SEB"))
        .with_class(ClassGroup::new("SEC"))
        .with_subject("SEA", SubjectSpec::new("ML", 2))
        .with_subject("SEB", SubjectSpec::new("AI", 2))
        .with_subject("SEC", SubjectSpec::new("CN", 2))
        .with_faculty(px)
        .with_faculty(py);
    for r in 0..rooms {
        input = input.with_room(Room::classroom(format!("R{r:02}")));
    }
    input
}

#[test]
fn test_cancel_before_start_from_another_thread() {
    let problem = Problem::new(full_week()).unwrap();
    let token = CancellationToken::new();
    let remote = token.clone();
    thread::spawn(move || remote.cancel()).join().unwrap();

    let result = BacktrackingScheduler::default().solve_with_cancel(&problem, &token);
    assert!(matches!(result, Err(TimetableError::Cancelled)));
}

#[test]
fn test_cancel_during_search() {
    let problem = Problem::new(overbooked_with_rooms(30)).unwrap();
    // The time limit only stops the run if the flag is never polled
    let scheduler = BacktrackingScheduler::new(
        SchedulerConfig::default()
            .with_max_backtracks(u64::MAX)
            .with_time_limit_ms(60_000),
    );
    let token = CancellationToken::new();
    let remote = token.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.cancel();
    });

    let started = Instant::now();
    let result = scheduler.solve_with_cancel(&problem, &token);
    canceller.join().unwrap();

    assert!(
        matches!(result, Err(TimetableError::Cancelled)),
        "expected cancellation, got {result:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[test]
fn test_lecture_falls_back_to_lab_room() {
    let input = TimetableInput::new(TimeGrid::uniform(6))
        .with_class(ClassGroup::new("SEA"))
        .with_subject("SEA", SubjectSpec::new("ML", 3))
        .with_faculty(Faculty::new("Prof X", "PX").with_capability("ML"))
        .with_room(Room::lab("LAB1"));
    let problem = Problem::new(input).unwrap();
    let tt = BacktrackingScheduler::default().solve(&problem).unwrap();
    assert!(verify(&problem, &tt).is_empty());
    assert_eq!(tt.occurrences("SEA", "ML"), 3);
    assert!(tt.assignments().iter().all(|a| a.room == "LAB1"));
}

#[test]
fn test_parallel_runs_are_isolated() {
    let problem = Problem::new(full_week()).unwrap();
    let scheduler = BacktrackingScheduler::default();
    let expected = scheduler.solve(&problem).unwrap();

    let results: Vec<Timetable> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| scheduler.solve(&problem).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(results.iter().all(|tt| *tt == expected));
}

#[test]
fn test_preferences_pick_faculty() {
    let input = TimetableInput::new(TimeGrid::uniform(6))
        .with_class(ClassGroup::new("SEA"))
        .with_subject("SEA", SubjectSpec::new("ML", 2))
        .with_faculty(Faculty::new("Prof A", "PA").with_capability("ML"))
        .with_faculty(
            Faculty::new("Prof B", "PB")
                .with_capability("ML")
                .with_preferences("SEA", ["ML"]),
        )
        .with_room(Room::classroom("R1"));
    let problem = Problem::new(input).unwrap();
    let tt = BacktrackingScheduler::default().solve(&problem).unwrap();
    assert!(tt.assignments().iter().all(|a| a.faculty == "PB"));

    let view = FacultyView::assemble(&problem, &tt, "PB").unwrap();
    assert_eq!(view.load, 2);
    assert_eq!(FacultyView::assemble(&problem, &tt, "PA").unwrap().load, 0);
}

#[test]
fn test_json_contract() {
    let input: TimetableInput = serde_json::from_str(
        r#"{
            "classes": [{"id": "SEA", "batches": ["SEA1", "SEA2"]}],
            "curriculum": {"SEA": [
                {"name": "Machine Learning", "short": "ML", "kind": "lecture", "duration_slots": 1, "weekly_hours": 3},
                {"name": "ML Lab", "short": "MLL", "kind": "lab", "duration_slots": 2, "weekly_hours": 2}
            ]},
            "faculty": [
                {"name": "Prof X", "short": "PX", "position": "Professor",
                 "capabilities": ["ML"], "preferences": {"SEA": ["ML"]}},
                {"name": "Prof Y", "short": "PY", "position": "Assistant Professor",
                 "capabilities": ["ML Lab"]}
            ],
            "rooms": [{"id": "301", "kind": "classroom"}, {"id": "LAB1", "kind": "lab"}],
            "grid": {"slots": [
                {"kind": "lecture", "start": "09:00", "end": "10:00"},
                {"kind": "lecture", "start": "10:00", "end": "11:00"},
                {"kind": "break", "start": "11:00", "end": "11:15"},
                {"kind": "lecture", "start": "11:15", "end": "12:15"}
            ]}
        }"#,
    )
    .unwrap();
    let problem = Problem::new(input).unwrap();
    let tt = BacktrackingScheduler::default().solve(&problem).unwrap();
    let weekly = WeeklyTimetable::assemble(&problem, &tt);
    let json = serde_json::to_value(&weekly).unwrap();

    assert_eq!(json["labels"], serde_json::json!(["L1", "L2", "L3"]));
    for day in ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"] {
        let cells = json["classes"]["SEA"][day].as_array().unwrap();
        assert_eq!(cells.len(), 3);
        for cell in cells {
            let kind = cell["entry"]["kind"].as_str().unwrap();
            assert!(kind == "lesson" || kind == "empty");
        }
    }
    let lessons = weekly
        .class("SEA")
        .unwrap()
        .values()
        .flatten()
        .filter(|c| matches!(c.entry, SlotEntry::Lesson { .. }))
        .count();
    // Three one-slot lectures plus one two-slot lab
    assert_eq!(lessons, 5);
}

#[test]
fn test_failure_report_json() {
    let input = sea_ml().with_subject("SEA", SubjectSpec::new("Compilers", 2));
    let err = BacktrackingScheduler::default().schedule(input).unwrap_err();
    let json = serde_json::to_value(err.report().unwrap()).unwrap();
    assert_eq!(json["cause"], "infeasible");
    assert_eq!(json["unmet"][0]["class_id"], "SEA");
    assert_eq!(json["unmet"][0]["subject"], "Compilers");
    assert_eq!(json["unmet"][0]["required"], 2);
    assert_eq!(json["unmet"][0]["placed"], 0);
}
