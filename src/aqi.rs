/// Value returned for categories outside 1–5.
pub const UNMAPPED_AQI: i32 = 42;

/// Maps an OpenWeather air-quality category (1–5) onto the midpoint of the
/// matching band of the 0–300 standard AQI scale.
///
/// | Category | Band      | Result |
/// |----------|-----------|--------|
/// | 1        | 0–50      | 25     |
/// | 2        | 51–100    | 75     |
/// | 3        | 101–150   | 125    |
/// | 4        | 151–200   | 175    |
/// | 5        | 201–300   | 250    |
///
/// Anything else yields [`UNMAPPED_AQI`].
pub fn to_standard_scale(category: i32) -> i32 {
    match category {
        1 => 25,
        2 => 75,
        3 => 125,
        4 => 175,
        5 => 250,
        _ => UNMAPPED_AQI,
    }
}
