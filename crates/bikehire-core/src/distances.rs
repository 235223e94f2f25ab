use polars::prelude::*;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::distance;
use crate::error::Result;
use crate::storage;

/// Joins journey facts against the docking-station dimension, once per
/// endpoint, and computes the per-journey great-circle distance.
///
/// Journeys without a returned bike (end_station_id <= 0) are excluded up
/// front. Each join projection is deduplicated on rental_id before the final
/// inner join so a duplicated station row cannot fan journeys out. Rows where
/// either station lookup misses are dropped after the join; the drop count is
/// logged since those journeys silently vanish from the dimension.
pub fn compute_distances(stations: &DataFrame, journeys: &DataFrame) -> Result<DataFrame> {
    let stations = stations.clone().lazy().select([
        col("docking_station_id"),
        col("docking_station_latitude"),
        col("docking_station_longitude"),
    ]);

    let journeys = journeys
        .clone()
        .lazy()
        .select([
            col("rental_id"),
            col("start_station_id"),
            col("end_station_id"),
            col("rental_start_day"),
            col("rental_start_month"),
            col("rental_start_year"),
        ])
        .filter(col("end_station_id").gt(lit(0)));

    let start_station = journeys
        .clone()
        .join(
            stations.clone(),
            [col("start_station_id")],
            [col("docking_station_id")],
            JoinArgs::new(JoinType::Left),
        )
        .select([
            col("rental_id"),
            col("start_station_id"),
            col("docking_station_latitude").alias("start_lat"),
            col("docking_station_longitude").alias("start_lon"),
            col("rental_start_year"),
            col("rental_start_month"),
            col("rental_start_day"),
        ])
        .unique_stable(
            Some(vec![String::from("rental_id").into()]),
            UniqueKeepStrategy::First,
        );

    let end_station = journeys
        .join(
            stations,
            [col("end_station_id")],
            [col("docking_station_id")],
            JoinArgs::new(JoinType::Left),
        )
        .select([
            col("rental_id"),
            col("end_station_id"),
            col("docking_station_latitude").alias("end_lat"),
            col("docking_station_longitude").alias("end_lon"),
        ])
        .unique_stable(
            Some(vec![String::from("rental_id").into()]),
            UniqueKeepStrategy::First,
        );

    let joined = start_station
        .join(
            end_station,
            [col("rental_id")],
            [col("rental_id")],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let complete = joined.clone().lazy().drop_nulls(None).collect()?;
    let dropped = joined.height() - complete.height();
    if dropped > 0 {
        warn!(
            dropped,
            "journeys dropped: no docking station match for one or both endpoints"
        );
    }

    Ok(distance::append_journey_distances(&complete)?)
}

/// Runs after the station and journey stages: re-reads their persisted
/// outputs rather than any in-memory dataset, which is what enforces the
/// stage ordering.
pub fn run(config: &PipelineConfig) -> Result<usize> {
    let stations = storage::read_parquet_dir(&config.stations_output())?;
    let journeys = storage::read_parquet_dir(&config.journeys_output())?;

    let dim_journey_distances = compute_distances(&stations, &journeys)?;

    let out = dim_journey_distances
        .clone()
        .lazy()
        .with_columns([
            col("rental_start_year").alias("rental_start_year_"),
            col("rental_start_month").alias("rental_start_month_"),
        ])
        .collect()?;
    storage::write_partitioned(
        &out,
        &config.journey_distances_output(),
        &["rental_start_year_", "rental_start_month_"],
    )?;

    info!(
        rows = dim_journey_distances.height(),
        "journey distance dimension written"
    );

    Ok(dim_journey_distances.height())
}
