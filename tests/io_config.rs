#![forbid(unsafe_code)]
#![cfg(feature = "serde")]
use chrono::{NaiveDate, TimeZone, Utc};
use rotaguard::config::{export_config_json, load_config_from_file, ConfigError};
use rotaguard::io;
use rotaguard::{
    Generation, PatternConfig, ShiftCode, ShiftWindow, Shortfall, ShortfallReason, StaffId,
};
use std::fs;
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn config_json_with_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pattern.json");
    fs::write(
        &path,
        r#"{
            "pattern_sequence": ["E", "L", "rest", "Night shift"],
            "requirements": {"E": 1, "L": 1, "N": 1},
            "initial_offsets": {"S1": 0, "S2": 1},
            "custom_shift_times": {"1": {"start": "13:00", "end": "21:00"}}
        }"#,
    )
    .unwrap();

    let config = load_config_from_file(&path).unwrap();
    assert_eq!(
        config.pattern_sequence,
        vec![ShiftCode::Early, ShiftCode::Late, ShiftCode::Rest, ShiftCode::Night]
    );
    assert_eq!(config.requirements.get(&ShiftCode::Night), Some(&1));
    assert_eq!(config.pattern_index(&StaffId::new("S2"), 0), 1);
    assert_eq!(
        config.window_for(1, &ShiftCode::Late),
        Some(ShiftWindow::parse("13:00", "21:00").unwrap())
    );
    assert!(config.shift_times.contains_key(&ShiftCode::Early));
}

#[test]
fn config_round_trips_through_export() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.json");
    let config = PatternConfig::new(vec![ShiftCode::Early, ShiftCode::Rest])
        .require(ShiftCode::Early, 2)
        .offset("S1", 1);
    export_config_json(&path, &config).unwrap();
    assert_eq!(load_config_from_file(&path).unwrap(), config);
}

#[test]
fn invalid_configs_are_rejected() {
    assert_eq!(PatternConfig::new(vec![]).validate(), Err(ConfigError::EmptyPattern));

    let window = ShiftWindow::parse("08:00", "16:00").unwrap();
    let out_of_range = PatternConfig::new(vec![ShiftCode::Early]).custom_times(3, window);
    assert_eq!(
        out_of_range.validate(),
        Err(ConfigError::CustomIndexOutOfRange { index: 3, len: 1 })
    );
    let on_rest = PatternConfig::new(vec![ShiftCode::Rest]).custom_times(0, window);
    assert_eq!(on_rest.validate(), Err(ConfigError::CustomTimesOnNonWorking(0)));

    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{"pattern_sequence": ["E"], "custom_shift_times": {"0": {"start": "24:30", "end": "06:00"}}}"#,
    )
    .unwrap();
    assert!(load_config_from_file(&path).is_err());
}

#[test]
fn staff_csv_with_legacy_headers() {
    let data = "Staff ID,Display Name,DOB,optOut\nS1,Sam,2009-02-01,no\nS2,,,yes\n";
    let staff = io::read_staff_csv(data.as_bytes()).unwrap();

    assert_eq!(staff.len(), 2);
    assert_eq!(staff[0].id, StaffId::new("S1"));
    assert_eq!(staff[0].name, "Sam");
    assert_eq!(staff[0].date_of_birth, Some(d(2009, 2, 1)));
    assert!(!staff[0].opt_out_48h);
    assert_eq!(staff[1].name, "S2");
    assert!(staff[1].opt_out_48h);

    assert!(io::read_staff_csv("id,name,dob\nS1,Sam,01/02/2009\n".as_bytes()).is_err());
}

#[test]
fn assignment_csv_aliases_and_clock_times() {
    let data = "\
staffId,date,startTime,endTime,code,isForced,reason
S1,2026-05-01,22:00,06:00,Night shift,true,Gap Fill
S2,2026-05-01,2026-05-01T07:00:00Z,2026-05-01T15:00:00Z,early,,
";
    let assignments = io::read_assignments_csv(data.as_bytes()).unwrap();

    assert_eq!(assignments.len(), 2);
    let night = &assignments[0];
    assert_eq!(night.staff_id, StaffId::new("S1"));
    assert_eq!(night.shift_code, ShiftCode::Night);
    assert_eq!(night.end, Utc.with_ymd_and_hms(2026, 5, 2, 6, 0, 0).unwrap());
    assert!(night.is_forced);
    assert_eq!(night.forced_reason.as_deref(), Some("Gap Fill"));
    assert_eq!(assignments[1].shift_code, ShiftCode::Early);
    assert!(!assignments[1].is_forced);
}

#[test]
fn malformed_assignment_rows_fail_fast() {
    let bad_time = "staff_id,date,start,end,shift_code\nS1,2026-05-01,25:00,06:00,N\n";
    assert!(io::read_assignments_csv(bad_time.as_bytes()).is_err());
    let missing_column = "staff_id,date,start,shift_code\nS1,2026-05-01,22:00,N\n";
    assert!(io::read_assignments_csv(missing_column.as_bytes()).is_err());
}

#[test]
fn assignments_round_trip_through_csv() {
    let data = "staff_id,date,start,end,shift_code\nS1,2026-05-01,22:00,06:00,N\n";
    let assignments = io::read_assignments_csv(data.as_bytes()).unwrap();

    let mut buf = Vec::new();
    io::write_assignments_csv(&mut buf, &assignments).unwrap();
    let back = io::read_assignments_csv(buf.as_slice()).unwrap();
    assert_eq!(back, assignments);
}

#[test]
fn shortfalls_csv_export() {
    let shortfalls = vec![
        Shortfall {
            date: d(2026, 5, 5),
            target_shift_code: ShiftCode::Early,
            reason: ShortfallReason::InsufficientRest,
        },
        Shortfall {
            date: d(2026, 5, 5),
            target_shift_code: ShiftCode::Late,
            reason: ShortfallReason::NoAvailableStaff,
        },
    ];
    let mut buf = Vec::new();
    io::write_shortfalls_csv(&mut buf, &shortfalls).unwrap();
    let csv = String::from_utf8(buf).unwrap();

    insta::assert_snapshot!(csv.trim_end(), @r"
    date,shift_code,reason
    2026-05-05,E,Insufficient rest
    2026-05-05,L,No available staff
    ");
}

#[test]
fn generation_json_is_written_atomically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("generation.json");
    let generation = Generation {
        assignments: Vec::new(),
        shortfalls: vec![Shortfall {
            date: d(2026, 5, 5),
            target_shift_code: ShiftCode::Night,
            reason: ShortfallReason::NoAvailableStaff,
        }],
    };
    io::write_json_atomic(&path, &generation).unwrap();

    let back: Generation = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(back, generation);
}
