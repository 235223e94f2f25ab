use std::fs;
use std::path::Path;

use bikehire_core::config::PipelineConfig;
use bikehire_core::{distances, journeys, stations, storage, weather};
use polars::prelude::*;
use tempfile::TempDir;

fn fixture_config(root: &TempDir) -> PipelineConfig {
    PipelineConfig {
        input_root: root.path().join("raw"),
        output_root: root.path().join("lake"),
        copy_source_root: "s3://lnd-bikehire/".to_string(),
        iam_role_arn: "arn:aws:iam::123456789012:role/warehouse-loader".to_string(),
        database_url: "postgres://localhost/unused".to_string(),
    }
}

fn seed_raw_inputs(input_root: &Path) {
    let infrastructure = input_root.join("infrastructure");
    fs::create_dir_all(&infrastructure).expect("infrastructure dir");
    fs::write(
        infrastructure.join("FOI-0689-2122.csv"),
        "docking_station_live_date,docking_station_name,docking_station_id,docking_points,docking_station_latitude,docking_station_longitude\n\
         30/07/2010,Soho Square,1,18,51.5,-0.1\n\
         30/07/2010,Kings Cross,2,32,51.6,-0.12\n",
    )
    .expect("stations fixture");

    let journey_dir = input_root.join("journey").join("2012");
    fs::create_dir_all(&journey_dir).expect("journey dir");
    fs::write(
        journey_dir.join("11. Journey Data Extract 23Aug-25 Aug12.csv"),
        "Rental Id,Duration,Bike Id,End Date,EndStation Id,EndStation Name,Start Date,StartStation Id,StartStation Name\n\
         1001,300,42,23/08/2012 14:10,2,Kings Cross,23/08/2012 14:05,1,Soho Square\n\
         1002,310,43,23/08/2012 15:00,1,Soho Square,23/08/2012 14:50,2,Kings Cross\n\
         1003,120,44,23/08/2012 16:00,0,,23/08/2012 15:55,1,Soho Square\n",
    )
    .expect("journeys fixture");

    let weather_dir = input_root.join("weather");
    fs::create_dir_all(&weather_dir).expect("weather dir");
    fs::write(
        weather_dir.join("london-2012-08.json"),
        r#"{ "days": [ { "datetime": "2012-08-23", "conditions": "Rain", "temp": 18.2 } ] }"#,
    )
    .expect("weather fixture");
}

#[test]
fn full_transform_pass_produces_all_outputs() -> PolarsResult<()> {
    let root = TempDir::new().expect("temp dir");
    let config = fixture_config(&root);
    seed_raw_inputs(&config.input_root);

    stations::run(&config).expect("station stage");
    let report = journeys::run(&config).expect("journey stage");
    assert_eq!(report.fact_rows, 3);

    // The distance stage re-reads the persisted outputs of the two stages
    // above.
    let distance_rows = distances::run(&config).expect("distance stage");
    assert_eq!(distance_rows, 2);

    let weather_rows = weather::run(&config).expect("weather stage");
    assert_eq!(weather_rows, 1);

    assert!(config
        .journeys_output()
        .join("rental_start_year_=2012")
        .join("rental_start_month_=8")
        .is_dir());
    assert!(config
        .time_output()
        .join("year_=2012")
        .join("month_=8")
        .is_dir());
    assert!(config
        .weather_output()
        .join("year_=2012")
        .join("month_=8")
        .is_dir());

    let dim = storage::read_parquet_dir(&config.journey_distances_output()).expect("read back");
    assert_eq!(dim.height(), 2);
    assert_eq!(dim.column("journey_distance_km")?.null_count(), 0);

    let distances_km = dim.column("journey_distance_km")?.f64()?;
    let first = distances_km.get(0).expect("distance present");
    assert!(first > 0.0);

    Ok(())
}
