use crate::config::{
    DOCKING_STATIONS_DIR, JOURNEYS_DIR, JOURNEY_DISTANCES_DIR, TIME_DIR, WEATHER_DIR,
};

/// Warehouse tables paired with the parquet directory their data is copied
/// from, in load order.
pub const WAREHOUSE_TABLES: [(&str, &str); 5] = [
    ("dim_docking_stations", DOCKING_STATIONS_DIR),
    ("dim_time", TIME_DIR),
    ("dim_journey_distances", JOURNEY_DISTANCES_DIR),
    ("dim_daily_weather", WEATHER_DIR),
    ("fact_journeys", JOURNEYS_DIR),
];

const DIM_DOCKING_STATIONS_CREATE: &str = r#"
    CREATE TABLE IF NOT EXISTS dim_docking_stations (
     docking_station_live_date VARCHAR(255),
     docking_station_name VARCHAR(255),
     docking_station_id INTEGER,
     docking_points INTEGER,
     docking_station_latitude DOUBLE PRECISION,
     docking_station_longitude DOUBLE PRECISION
    )diststyle all;
"#;

const DIM_TIME_CREATE: &str = r#"
    CREATE TABLE IF NOT EXISTS dim_time (
    rental_start_date TIMESTAMP NOT NULL,
    hour INTEGER NOT NULL,
    day INTEGER NOT NULL,
    weekday INTEGER NOT NULL,
    week INTEGER NOT NULL,
    month INTEGER NOT NULL,
    year INTEGER NOT NULL
    )diststyle all;
"#;

const DIM_JOURNEY_DISTANCES_CREATE: &str = r#"
    CREATE TABLE IF NOT EXISTS dim_journey_distances (
    rental_id INTEGER NOT NULL,
    start_station_id INTEGER,
    start_lat DOUBLE PRECISION,
    start_lon DOUBLE PRECISION,
    rental_start_year INTEGER,
    rental_start_month INTEGER,
    rental_start_day INTEGER,
    end_station_id INTEGER,
    end_lat DOUBLE PRECISION,
    end_lon DOUBLE PRECISION,
    journey_distance_km DOUBLE PRECISION
    )diststyle even;
"#;

const DIM_DAILY_WEATHER_CREATE: &str = r#"
    CREATE TABLE IF NOT EXISTS dim_daily_weather (
    date TIMESTAMP NOT NULL,
    year INTEGER,
    month INTEGER,
    day_of_month INTEGER,
    conditions VARCHAR(255),
    description VARCHAR(255),
    avg_temp DOUBLE PRECISION,
    min_temp DOUBLE PRECISION,
    max_temp DOUBLE PRECISION,
    precipitation DOUBLE PRECISION,
    windspeed DOUBLE PRECISION,
    sunrise VARCHAR(255),
    sunset VARCHAR(255)
    )diststyle all;
"#;

const FACT_JOURNEYS_CREATE: &str = r#"
    CREATE TABLE IF NOT EXISTS fact_journeys (
    rental_id INTEGER NOT NULL,
    bike_id INTEGER NOT NULL,
    rental_duration_seconds INTEGER,
    start_station_id INTEGER,
    rental_start_date TIMESTAMP,
    end_station_id INTEGER,
    rental_end_date TIMESTAMP,
    rental_start_year INTEGER,
    rental_start_month INTEGER,
    rental_start_day INTEGER
    )diststyle even;
"#;

pub fn drop_table_statements() -> Vec<String> {
    WAREHOUSE_TABLES
        .iter()
        .map(|(table, _)| format!("DROP TABLE IF EXISTS {};", table))
        .collect()
}

pub fn create_table_statements() -> Vec<String> {
    vec![
        DIM_DOCKING_STATIONS_CREATE.to_string(),
        DIM_TIME_CREATE.to_string(),
        DIM_JOURNEY_DISTANCES_CREATE.to_string(),
        DIM_DAILY_WEATHER_CREATE.to_string(),
        FACT_JOURNEYS_CREATE.to_string(),
    ]
}

/// Bulk-copy statements from the partitioned parquet outputs, authenticated
/// via the configured role identifier.
pub fn copy_table_statements(copy_source_root: &str, iam_role_arn: &str) -> Vec<String> {
    let root = copy_source_root.trim_end_matches('/');
    WAREHOUSE_TABLES
        .iter()
        .map(|(table, dir)| {
            format!(
                "COPY {table}\nFROM '{root}/{dir}/'\niam_role {iam_role_arn}\nformat as parquet;"
            )
        })
        .collect()
}

/// The full ordered load queue: drop everything, recreate, then copy, table
/// by table.
pub fn all_load_statements(copy_source_root: &str, iam_role_arn: &str) -> Vec<String> {
    let mut statements = drop_table_statements();
    statements.extend(create_table_statements());
    statements.extend(copy_table_statements(copy_source_root, iam_role_arn));
    statements
}
