use polars::prelude::*;

const EARTH_RADIUS_KM: f64 = 6371.01;

/// Great-circle distance in kilometers between two coordinate pairs given in
/// degrees, computed with the spherical law of cosines and rounded to two
/// decimal places.
///
/// Exactly-equal endpoints short-circuit to 0.0. The arccos argument is
/// clamped to [-1, 1]: for nearly identical coordinates the floating-point
/// sum can drift marginally outside the domain.
pub fn journey_distance_km(start_lat: f64, start_lon: f64, end_lat: f64, end_lon: f64) -> f64 {
    let slat = start_lat.to_radians();
    let slon = start_lon.to_radians();
    let elat = end_lat.to_radians();
    let elon = end_lon.to_radians();

    if slat == elat && slon == elon {
        return 0.0;
    }

    let cos_angle =
        (slat.sin() * elat.sin() + slat.cos() * elat.cos() * (slon - elon).cos()).clamp(-1.0, 1.0);
    let distance = EARTH_RADIUS_KM * cos_angle.acos();

    (distance * 100.0).round() / 100.0
}

/// Appends a `journey_distance_km` column computed row-wise from the
/// `start_lat`/`start_lon`/`end_lat`/`end_lon` columns. Rows with a missing
/// coordinate produce a null distance; the join stage drops such rows before
/// calling this, so nulls here mean a caller skipped that step.
pub fn append_journey_distances(df: &DataFrame) -> Result<DataFrame, PolarsError> {
    let len = df.height();

    let start_lat = df.column("start_lat")?.f64()?;
    let start_lon = df.column("start_lon")?.f64()?;
    let end_lat = df.column("end_lat")?.f64()?;
    let end_lon = df.column("end_lon")?.f64()?;

    let mut distances: Vec<Option<f64>> = Vec::with_capacity(len);
    for idx in 0..len {
        let value = match (
            start_lat.get(idx),
            start_lon.get(idx),
            end_lat.get(idx),
            end_lon.get(idx),
        ) {
            (Some(slat), Some(slon), Some(elat), Some(elon)) => {
                Some(journey_distance_km(slat, slon, elat, elon))
            }
            _ => None,
        };
        distances.push(value);
    }

    let mut output = df.clone();
    output.hstack_mut(&mut [Series::new("journey_distance_km".into(), distances).into()])?;

    Ok(output)
}
