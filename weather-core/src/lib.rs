//! Core library for the weather proxy service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the `WeatherProvider` abstraction
//! - Normalization of provider data into the client-facing record
//! - A TTL cache and the search history store
//! - `WeatherService`, which runs the per-request lookup pipeline
//!
//! It is used by `weather-server`, but has no HTTP server concerns of its own.

pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod provider;

pub use cache::{MemoryCache, WeatherCache};
pub use config::Config;
pub use error::{ErrorKind, WeatherError};
pub use history::{FileHistory, HistoryStore, MemoryHistory};
pub use model::{NormalizedWeather, RawWeather, SearchRecord};
pub use pipeline::{Lookup, Source, WeatherService};
pub use provider::WeatherProvider;
