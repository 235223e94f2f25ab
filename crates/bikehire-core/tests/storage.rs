use bikehire_core::storage::{read_parquet_dir, write_parquet, write_partitioned};
use polars::prelude::*;
use tempfile::TempDir;

fn partitioned_fixture() -> DataFrame {
    df!(
        "rental_id" => &[1i32, 2, 3],
        "value" => &[10.0f64, 20.0, 30.0],
        "year" => &[2012i32, 2012, 2013],
        "month" => &[1i32, 2, 1],
        "year_" => &[2012i32, 2012, 2013],
        "month_" => &[1i32, 2, 1],
    )
    .expect("fixture frame")
}

#[test]
fn partitioned_write_round_trips() -> PolarsResult<()> {
    let dir = TempDir::new().expect("temp dir");
    let dest = dir.path().join("journeys");

    write_partitioned(&partitioned_fixture(), &dest, &["year_", "month_"]).expect("write");

    assert!(dest.join("year_=2012").join("month_=1").is_dir());
    assert!(dest.join("year_=2012").join("month_=2").is_dir());
    assert!(dest.join("year_=2013").join("month_=1").is_dir());

    let back = read_parquet_dir(&dest)
        .expect("read back")
        .lazy()
        .sort(["rental_id"], SortMultipleOptions::default())
        .collect()?;

    // Partition columns live in the directory names, not in the row data;
    // the plain year/month columns survive.
    let names: Vec<&str> = back
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();
    assert_eq!(names, vec!["rental_id", "value", "year", "month"]);

    assert_eq!(back.height(), 3);
    let values = back.column("value")?.f64()?;
    assert_eq!(values.get(0), Some(10.0));
    assert_eq!(values.get(2), Some(30.0));
    let years = back.column("year")?.i32()?;
    assert_eq!(years.get(2), Some(2013));

    Ok(())
}

#[test]
fn writes_overwrite_previous_runs() -> PolarsResult<()> {
    let dir = TempDir::new().expect("temp dir");
    let dest = dir.path().join("time");

    write_partitioned(&partitioned_fixture(), &dest, &["year_", "month_"]).expect("first write");

    let replacement = df!(
        "rental_id" => &[9i32],
        "value" => &[90.0f64],
        "year" => &[2014i32],
        "month" => &[6i32],
        "year_" => &[2014i32],
        "month_" => &[6i32],
    )?;
    write_partitioned(&replacement, &dest, &["year_", "month_"]).expect("second write");

    assert!(!dest.join("year_=2012").exists());
    let back = read_parquet_dir(&dest).expect("read back");
    assert_eq!(back.height(), 1);

    Ok(())
}

#[test]
fn unpartitioned_write_round_trips() -> PolarsResult<()> {
    let dir = TempDir::new().expect("temp dir");
    let dest = dir.path().join("infrastructure").join("docking_stations");

    let df = df!(
        "docking_station_id" => &[1i32, 2],
        "docking_station_latitude" => &[51.5f64, 51.6],
    )?;
    write_parquet(&df, &dest).expect("write");

    let back = read_parquet_dir(&dest).expect("read back");
    assert!(back.equals(&df));

    Ok(())
}

#[test]
fn reading_an_empty_tree_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    assert!(read_parquet_dir(dir.path()).is_err());
}
