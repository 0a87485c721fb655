//! CSV loading against real files on disk, including the failure modes
//! a user will actually hit: wrong paths, missing columns, bad cells.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use custdash::data::load_csv;
use custdash::domain::DashError;
use custdash::record::{Plan, SignupDate, Status};

/// A throwaway CSV file in the system temp dir, removed on drop.
struct TempCsv(PathBuf);

impl TempCsv {
    fn new(name: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("custdash-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempCsv {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

#[test]
fn loads_a_well_formed_file() {
    let file = TempCsv::new(
        "ok.csv",
        "id,name,email,plan,status,signup_date,spend\n\
         cus_0001,\"Lovelace, Ada\",ada@example.com,Pro,Active,2023-05-17,1200.5\n\
         cus_0002,  Alan Turing  ,alan@example.com,free,trial,2022-01-07,0\n\
         cus_0003,Grace Hopper,grace@example.com,Business,Churned,2024-11-30,19999.99\n",
    );

    let report = load_csv(file.path()).unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.bad_dates, 0);

    let ada = &report.records[0];
    assert_eq!(ada.id, "cus_0001");
    assert_eq!(ada.name, "Lovelace, Ada");
    assert_eq!(ada.plan, Plan::Pro);
    assert_eq!(ada.status, Status::Active);
    assert_eq!(ada.signup_date.date(), NaiveDate::from_ymd_opt(2023, 5, 17));
    assert!((ada.spend - 1200.5).abs() < 1e-6);

    // surrounding whitespace is trimmed, labels parse case-insensitively
    let alan = &report.records[1];
    assert_eq!(alan.name, "Alan Turing");
    assert_eq!(alan.plan, Plan::Free);
    assert_eq!(alan.status, Status::Trial);
    assert!((alan.spend - 0.0).abs() < 1e-6);

    assert!((report.records[2].spend - 19999.99).abs() < 1e-6);
}

#[test]
fn unparsable_dates_are_counted_not_dropped() {
    let file = TempCsv::new(
        "dates.csv",
        "id,name,email,plan,status,signup_date,spend\n\
         cus_0001,Ada,ada@example.com,Pro,Active,2023-05-17,100\n\
         cus_0002,Alan,alan@example.com,Free,Trial,17/05/2023,200\n\
         cus_0003,Grace,grace@example.com,Free,Active,2024-02-29,300\n",
    );

    let report = load_csv(file.path()).unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.bad_dates, 1);
    assert_eq!(
        report.records[1].signup_date,
        SignupDate::Invalid("17/05/2023".to_string())
    );
    assert!(report.records[2].signup_date.date().is_some());
}

#[test]
fn a_missing_column_fails_the_load() {
    let file = TempCsv::new(
        "noplan.csv",
        "id,name,email,status,signup_date,spend\n\
         cus_0001,Ada,ada@example.com,Active,2023-05-17,100\n",
    );

    match load_csv(file.path()) {
        Err(DashError::MissingColumn(column)) => assert_eq!(column, "plan"),
        other => panic!("expected a missing column error, got {other:?}"),
    }
}

#[test]
fn an_unknown_plan_fails_with_its_row_number() {
    let file = TempCsv::new(
        "badplan.csv",
        "id,name,email,plan,status,signup_date,spend\n\
         cus_0001,Ada,ada@example.com,platinum,Active,2023-05-17,100\n",
    );

    match load_csv(file.path()) {
        Err(DashError::BadValue { row, column, value }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "plan");
            assert_eq!(value, "platinum");
        }
        other => panic!("expected a bad value error, got {other:?}"),
    }
}

#[test]
fn an_unknown_status_fails_with_its_row_number() {
    let file = TempCsv::new(
        "badstatus.csv",
        "id,name,email,plan,status,signup_date,spend\n\
         cus_0001,Ada,ada@example.com,Pro,Active,2023-05-17,100\n\
         cus_0002,Alan,alan@example.com,Free,paused,2022-01-07,200\n",
    );

    match load_csv(file.path()) {
        Err(DashError::BadValue { row, column, .. }) => {
            assert_eq!(row, 3);
            assert_eq!(column, "status");
        }
        other => panic!("expected a bad value error, got {other:?}"),
    }
}

#[test]
fn spend_must_be_a_nonnegative_number() {
    let negative = TempCsv::new(
        "negspend.csv",
        "id,name,email,plan,status,signup_date,spend\n\
         cus_0001,Ada,ada@example.com,Pro,Active,2023-05-17,-12.5\n",
    );
    assert!(matches!(
        load_csv(negative.path()),
        Err(DashError::BadValue { row: 2, column: "spend", .. })
    ));

    let garbage = TempCsv::new(
        "textspend.csv",
        "id,name,email,plan,status,signup_date,spend\n\
         cus_0001,Ada,ada@example.com,Pro,Active,2023-05-17,lots\n",
    );
    assert!(matches!(
        load_csv(garbage.path()),
        Err(DashError::BadValue { row: 2, column: "spend", .. })
    ));
}

#[test]
fn an_empty_required_cell_fails_the_load() {
    let file = TempCsv::new(
        "noname.csv",
        "id,name,email,plan,status,signup_date,spend\n\
         cus_0001,,ada@example.com,Pro,Active,2023-05-17,100\n",
    );

    assert!(matches!(
        load_csv(file.path()),
        Err(DashError::BadValue { row: 2, column: "name", .. })
    ));
}

#[test]
fn column_order_in_the_file_does_not_matter() {
    let file = TempCsv::new(
        "shuffled.csv",
        "spend,id,signup_date,email,status,plan,name\n\
         1200.5,cus_0001,2023-05-17,ada@example.com,Active,Pro,Ada Lovelace\n",
    );

    let report = load_csv(file.path()).unwrap();
    let ada = &report.records[0];
    assert_eq!(ada.id, "cus_0001");
    assert_eq!(ada.name, "Ada Lovelace");
    assert_eq!(ada.plan, Plan::Pro);
    assert!((ada.spend - 1200.5).abs() < 1e-6);
}

#[test]
fn a_header_only_file_yields_no_records() {
    let file = TempCsv::new("empty.csv", "id,name,email,plan,status,signup_date,spend\n");

    let report = load_csv(file.path()).unwrap();
    assert!(report.records.is_empty());
    assert_eq!(report.bad_dates, 0);
}

#[test]
fn duplicate_ids_are_kept() {
    let file = TempCsv::new(
        "dupes.csv",
        "id,name,email,plan,status,signup_date,spend\n\
         cus_0001,Ada,ada@example.com,Pro,Active,2023-05-17,100\n\
         cus_0001,Alan,alan@example.com,Free,Trial,2022-01-07,200\n",
    );

    let report = load_csv(file.path()).unwrap();
    assert_eq!(report.records.len(), 2);
}

#[test]
fn wrong_paths_are_rejected_before_reading() {
    let absent = std::env::temp_dir().join(format!("custdash-{}-absent.csv", std::process::id()));
    assert!(matches!(load_csv(&absent), Err(DashError::FileNotFound)));

    let not_csv = TempCsv::new("notes.txt", "hello");
    assert!(matches!(load_csv(not_csv.path()), Err(DashError::UnknownFileType)));

    assert!(matches!(
        load_csv(&std::env::temp_dir()),
        Err(DashError::LoadingFailed(_))
    ));
}
