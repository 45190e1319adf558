//! Mapping from provider bodies to the client-facing record.

use crate::model::{NormalizedWeather, RawMain, RawSys, RawWeather, RawWind};

/// Round to one decimal place, half away from zero (25.67 -> 25.7, 3.45 -> 3.5).
///
/// Values too large to scale are returned unchanged.
pub fn round1(value: f64) -> f64 {
    let scaled = value * 10.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 10.0
}

/// Never fails: absent fields become `0` or an empty string.
pub fn normalize(raw: &RawWeather) -> NormalizedWeather {
    let main = raw.main.clone().unwrap_or_default();
    let wind = raw.wind.clone().unwrap_or_default();
    let sys = raw.sys.clone().unwrap_or_default();

    let RawMain { temp, feels_like, humidity, pressure } = main;
    let RawWind { speed, deg } = wind;
    let RawSys { country } = sys;

    NormalizedWeather {
        city: raw.name.clone().unwrap_or_default(),
        country: country.unwrap_or_default(),
        temperature: round1(temp.unwrap_or_default()),
        feels_like: round1(feels_like.unwrap_or_default()),
        humidity: humidity.unwrap_or_default(),
        pressure: pressure.unwrap_or_default(),
        wind_speed: round1(speed.unwrap_or_default()),
        wind_direction: deg.unwrap_or_default(),
        visibility: raw.visibility.unwrap_or_default(),
    }
}
