use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Deserialize;
use tracing::info;

use crate::config::{PipelineConfig, WEATHER_INPUT_GLOB};
use crate::error::{PipelineError, Result};
use crate::storage;

const WEATHER_DATE_FORMAT: &str = "%Y-%m-%d";

/// One raw weather document; each holds a nested array of per-day records.
#[derive(Debug, Deserialize)]
struct WeatherDocument {
    #[serde(default)]
    days: Vec<DailyRecord>,
}

#[derive(Debug, Deserialize)]
struct DailyRecord {
    datetime: Option<String>,
    conditions: Option<String>,
    description: Option<String>,
    temp: Option<f64>,
    tempmin: Option<f64>,
    tempmax: Option<f64>,
    precip: Option<f64>,
    windspeed: Option<f64>,
    sunrise: Option<String>,
    sunset: Option<String>,
}

/// Flattens the nested daily records of every weather document into one row
/// per (document, day). A datetime that fails to parse leaves the date and
/// its derived columns null for that row.
pub fn transform_weather(sources: &[PathBuf]) -> Result<DataFrame> {
    if sources.is_empty() {
        return Err(PipelineError::Processing(
            "no weather files found".to_string(),
        ));
    }

    let mut dates: Vec<Option<NaiveDate>> = Vec::new();
    let mut years: Vec<Option<i32>> = Vec::new();
    let mut months: Vec<Option<i32>> = Vec::new();
    let mut days_of_month: Vec<Option<i32>> = Vec::new();
    let mut conditions: Vec<Option<String>> = Vec::new();
    let mut descriptions: Vec<Option<String>> = Vec::new();
    let mut avg_temps: Vec<Option<f64>> = Vec::new();
    let mut min_temps: Vec<Option<f64>> = Vec::new();
    let mut max_temps: Vec<Option<f64>> = Vec::new();
    let mut precipitation: Vec<Option<f64>> = Vec::new();
    let mut windspeeds: Vec<Option<f64>> = Vec::new();
    let mut sunrises: Vec<Option<String>> = Vec::new();
    let mut sunsets: Vec<Option<String>> = Vec::new();

    for path in sources {
        let file = File::open(path)?;
        let document: WeatherDocument = serde_json::from_reader(BufReader::new(file))?;

        for day in document.days {
            let date = day
                .datetime
                .as_deref()
                .and_then(|raw| NaiveDate::parse_from_str(raw, WEATHER_DATE_FORMAT).ok());

            dates.push(date);
            years.push(date.map(|d| d.year()));
            months.push(date.map(|d| d.month() as i32));
            days_of_month.push(date.map(|d| d.day() as i32));
            conditions.push(day.conditions);
            descriptions.push(day.description);
            avg_temps.push(day.temp);
            min_temps.push(day.tempmin);
            max_temps.push(day.tempmax);
            precipitation.push(day.precip);
            windspeeds.push(day.windspeed);
            sunrises.push(day.sunrise);
            sunsets.push(day.sunset);
        }
    }

    let dim_daily_weather = df![
        "date" => dates,
        "year" => years,
        "month" => months,
        "day_of_month" => days_of_month,
        "conditions" => conditions,
        "description" => descriptions,
        "avg_temp" => avg_temps,
        "min_temp" => min_temps,
        "max_temp" => max_temps,
        "precipitation" => precipitation,
        "windspeed" => windspeeds,
        "sunrise" => sunrises,
        "sunset" => sunsets,
    ]?;

    Ok(dim_daily_weather)
}

pub fn run(config: &PipelineConfig) -> Result<usize> {
    let sources = config.input_files(WEATHER_INPUT_GLOB)?;
    let dim_daily_weather = transform_weather(&sources)?;

    let out = dim_daily_weather
        .clone()
        .lazy()
        .with_columns([col("year").alias("year_"), col("month").alias("month_")])
        .collect()?;
    storage::write_partitioned(&out, &config.weather_output(), &["year_", "month_"])?;

    info!(
        rows = dim_daily_weather.height(),
        "daily weather dimension written"
    );

    Ok(dim_daily_weather.height())
}
