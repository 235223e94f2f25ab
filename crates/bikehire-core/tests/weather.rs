use std::fs;
use std::path::PathBuf;

use bikehire_core::weather::transform_weather;
use polars::prelude::*;
use tempfile::TempDir;

fn write_weather(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("fixture written");
    path
}

#[test]
fn nested_days_flatten_to_one_row_each() -> PolarsResult<()> {
    let dir = TempDir::new().expect("temp dir");
    let path = write_weather(
        &dir,
        "london-2012-08.json",
        r#"{
            "latitude": 51.5,
            "longitude": -0.1,
            "days": [
                {
                    "datetime": "2012-08-23",
                    "conditions": "Rain",
                    "description": "Light rain through the afternoon",
                    "temp": 18.2,
                    "tempmin": 12.1,
                    "tempmax": 22.4,
                    "precip": 3.2,
                    "windspeed": 14.8,
                    "sunrise": "05:56:22",
                    "sunset": "20:11:15"
                },
                { "datetime": "2012-08-24", "temp": 19.0 }
            ]
        }"#,
    );

    let dim = transform_weather(&[path]).expect("transform succeeded");
    assert_eq!(dim.height(), 2);

    let years = dim.column("year")?.i32()?;
    let months = dim.column("month")?.i32()?;
    let days = dim.column("day_of_month")?.i32()?;
    assert_eq!(years.get(0), Some(2012));
    assert_eq!(months.get(0), Some(8));
    assert_eq!(days.get(0), Some(23));
    assert_eq!(days.get(1), Some(24));

    let conditions = dim.column("conditions")?.str()?;
    assert_eq!(conditions.get(0), Some("Rain"));
    assert_eq!(conditions.get(1), None);

    let avg_temps = dim.column("avg_temp")?.f64()?;
    assert_eq!(avg_temps.get(1), Some(19.0));

    Ok(())
}

#[test]
fn bad_datetimes_leave_null_date_columns() -> PolarsResult<()> {
    let dir = TempDir::new().expect("temp dir");
    let path = write_weather(
        &dir,
        "broken.json",
        r#"{ "days": [ { "datetime": "23/08/2012", "temp": 17.0 } ] }"#,
    );

    let dim = transform_weather(&[path]).expect("transform succeeded");
    assert_eq!(dim.height(), 1);

    assert_eq!(dim.column("date")?.null_count(), 1);
    assert_eq!(dim.column("year")?.null_count(), 1);
    assert_eq!(dim.column("month")?.null_count(), 1);

    let avg_temps = dim.column("avg_temp")?.f64()?;
    assert_eq!(avg_temps.get(0), Some(17.0));

    Ok(())
}

#[test]
fn rows_accumulate_across_documents() -> PolarsResult<()> {
    let dir = TempDir::new().expect("temp dir");
    let first = write_weather(
        &dir,
        "a.json",
        r#"{ "days": [ { "datetime": "2012-08-23" } ] }"#,
    );
    let second = write_weather(
        &dir,
        "b.json",
        r#"{ "days": [ { "datetime": "2012-09-01" }, { "datetime": "2012-09-02" } ] }"#,
    );

    let dim = transform_weather(&[first, second]).expect("transform succeeded");
    assert_eq!(dim.height(), 3);

    Ok(())
}

#[test]
fn missing_input_is_an_error() {
    assert!(transform_weather(&[]).is_err());
}
