use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use polars::prelude::*;
use tracing::info;

use crate::config::{PipelineConfig, STATIONS_INPUT_GLOB};
use crate::error::{PipelineError, Result};
use crate::storage;

/// Column order and types of the raw docking-station extract.
fn station_schema() -> Schema {
    Schema::from_iter([
        Field::new("docking_station_live_date".into(), DataType::String),
        Field::new("docking_station_name".into(), DataType::String),
        Field::new("docking_station_id".into(), DataType::Int32),
        Field::new("docking_points".into(), DataType::Int32),
        Field::new("docking_station_latitude".into(), DataType::Float64),
        Field::new("docking_station_longitude".into(), DataType::Float64),
    ])
}

/// Reads the docking-station extract(s) under the declared schema. The
/// dimension is a straight projection of the source; rows that fail a cast
/// surface as nulls rather than errors.
pub fn transform_stations(sources: &[PathBuf]) -> Result<DataFrame> {
    if sources.is_empty() {
        return Err(PipelineError::Processing(
            "no docking station files found".to_string(),
        ));
    }

    let mut combined = read_station_csv(&sources[0])?;
    for path in &sources[1..] {
        combined.vstack_mut(&read_station_csv(path)?)?;
    }
    Ok(combined)
}

pub fn run(config: &PipelineConfig) -> Result<usize> {
    let sources = config.input_files(STATIONS_INPUT_GLOB)?;
    let dim_docking_stations = transform_stations(&sources)?;

    storage::write_parquet(&dim_docking_stations, &config.stations_output())?;
    info!(
        rows = dim_docking_stations.height(),
        "docking station dimension written"
    );

    Ok(dim_docking_stations.height())
}

fn read_station_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_schema(Some(Arc::new(station_schema())))
        .with_ignore_errors(true)
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}
