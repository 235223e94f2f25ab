use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::info;

use crate::config::{PipelineConfig, JOURNEYS_INPUT_GLOB};
use crate::error::{PipelineError, Result};
use crate::storage;

/// Timestamp format used by the raw journey extracts.
const JOURNEY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug)]
pub struct JourneyStageReport {
    pub time_rows: usize,
    pub fact_rows: usize,
}

/// Column order and types of the raw journey extracts. Timestamps arrive as
/// strings and are parsed during staging.
fn journey_schema() -> Schema {
    Schema::from_iter([
        Field::new("Rental Id".into(), DataType::Int32),
        Field::new("Duration".into(), DataType::Int32),
        Field::new("Bike Id".into(), DataType::Int32),
        Field::new("End Date".into(), DataType::String),
        Field::new("EndStation Id".into(), DataType::Int32),
        Field::new("EndStation Name".into(), DataType::String),
        Field::new("Start Date".into(), DataType::String),
        Field::new("StartStation Id".into(), DataType::Int32),
        Field::new("StartStation Name".into(), DataType::String),
    ])
}

fn journey_strptime_options() -> StrptimeOptions {
    StrptimeOptions {
        format: Some(JOURNEY_TIMESTAMP_FORMAT.into()),
        strict: false,
        exact: true,
        cache: true,
    }
}

/// Scheme launch cutoff: rows at or before this instant are noise from the
/// trial period and are dropped.
fn earliest_rental_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2012, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Staging transforms over the raw journey extracts: timestamp parsing (rows
/// that fail to parse get null timestamps and fall to the date filter), the
/// start-date filter, rental_id dedup and the derived year/month/day columns.
///
/// Duplicate rental ids keep their first occurrence in source order, with
/// sources read in sorted path order.
pub fn stage_journeys(sources: &[PathBuf]) -> Result<DataFrame> {
    if sources.is_empty() {
        return Err(PipelineError::Processing(
            "no journey files found".to_string(),
        ));
    }

    let mut frames = Vec::with_capacity(sources.len());
    for path in sources {
        frames.push(read_journey_csv(path)?.lazy());
    }
    let raw = concat(&frames, UnionArgs::default())?;

    let staged = raw
        .with_columns([
            col("Start Date")
                .str()
                .to_datetime(
                    Some(TimeUnit::Microseconds),
                    None,
                    journey_strptime_options(),
                    lit("raise"),
                )
                .alias("rental_start_date"),
            col("End Date")
                .str()
                .to_datetime(
                    Some(TimeUnit::Microseconds),
                    None,
                    journey_strptime_options(),
                    lit("raise"),
                )
                .alias("rental_end_date"),
        ])
        .filter(col("rental_start_date").gt(lit(earliest_rental_start())))
        .select([
            col("Rental Id").alias("rental_id"),
            col("Bike Id").alias("bike_id"),
            col("Duration").alias("rental_duration_seconds"),
            col("StartStation Id").alias("start_station_id"),
            col("rental_start_date"),
            col("EndStation Id").alias("end_station_id"),
            col("rental_end_date"),
        ])
        .unique_stable(
            Some(vec![String::from("rental_id").into()]),
            UniqueKeepStrategy::First,
        )
        .with_columns([
            col("rental_start_date")
                .dt()
                .year()
                .cast(DataType::Int32)
                .alias("rental_start_year"),
            col("rental_start_date")
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias("rental_start_month"),
            col("rental_start_date")
                .dt()
                .day()
                .cast(DataType::Int32)
                .alias("rental_start_day"),
        ]);

    Ok(staged.collect()?)
}

/// Projects the time dimension from the staging dataset: one row per distinct
/// rental_start_date. The raw feed repeats the same minute across many
/// journeys, so the projection is deduplicated by the timestamp itself.
pub fn time_dimension(staging: &DataFrame) -> Result<DataFrame> {
    let dim_time = staging
        .clone()
        .lazy()
        .select([col("rental_start_date")])
        .unique_stable(
            Some(vec![String::from("rental_start_date").into()]),
            UniqueKeepStrategy::First,
        )
        .with_columns([
            col("rental_start_date")
                .dt()
                .hour()
                .cast(DataType::Int32)
                .alias("hour"),
            col("rental_start_date")
                .dt()
                .day()
                .cast(DataType::Int32)
                .alias("day"),
            col("rental_start_date")
                .dt()
                .weekday()
                .cast(DataType::Int32)
                .alias("weekday"),
            col("rental_start_date")
                .dt()
                .week()
                .cast(DataType::Int32)
                .alias("week"),
            col("rental_start_date")
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias("month"),
            col("rental_start_date")
                .dt()
                .year()
                .cast(DataType::Int32)
                .alias("year"),
        ])
        .collect()?;

    Ok(dim_time)
}

/// Projects the journeys fact table from the staging dataset.
pub fn journeys_fact(staging: &DataFrame) -> Result<DataFrame> {
    let fact_journeys = staging
        .clone()
        .lazy()
        .select([
            col("rental_id"),
            col("bike_id"),
            col("rental_duration_seconds"),
            col("start_station_id"),
            col("rental_start_date"),
            col("end_station_id"),
            col("rental_end_date"),
            col("rental_start_year"),
            col("rental_start_month"),
            col("rental_start_day"),
        ])
        .collect()?;

    Ok(fact_journeys)
}

pub fn run(config: &PipelineConfig) -> Result<JourneyStageReport> {
    let sources = config.input_files(JOURNEYS_INPUT_GLOB)?;
    let staging = stage_journeys(&sources)?;

    let dim_time = time_dimension(&staging)?;
    let dim_time_out = dim_time
        .clone()
        .lazy()
        .with_columns([col("year").alias("year_"), col("month").alias("month_")])
        .collect()?;
    storage::write_partitioned(&dim_time_out, &config.time_output(), &["year_", "month_"])?;

    let fact_journeys = journeys_fact(&staging)?;
    let fact_out = fact_journeys
        .clone()
        .lazy()
        .with_columns([
            col("rental_start_year").alias("rental_start_year_"),
            col("rental_start_month").alias("rental_start_month_"),
        ])
        .collect()?;
    storage::write_partitioned(
        &fact_out,
        &config.journeys_output(),
        &["rental_start_year_", "rental_start_month_"],
    )?;

    info!(
        time_rows = dim_time.height(),
        fact_rows = fact_journeys.height(),
        "journey outputs written"
    );

    Ok(JourneyStageReport {
        time_rows: dim_time.height(),
        fact_rows: fact_journeys.height(),
    })
}

fn read_journey_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_schema(Some(Arc::new(journey_schema())))
        .with_ignore_errors(true)
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}
