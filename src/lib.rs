//! `TripAgent` - AI-assisted travel itinerary planning
//!
//! This library collects a traveler's destination, dates, budget and
//! interests, drives a generative model (optionally through a one-level
//! weather tool call) and returns a structured day-by-day itinerary.

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod gemini;
pub mod models;
pub mod tools;
pub mod web;

// Re-export core types for public API
pub use agent::{LiveModelPlanner, MockPlanner, Planner, planner_for};
pub use config::{PlannerMode, TripAgentConfig};
pub use error::TripAgentError;
pub use gemini::{GeminiClient, ModelClient};
pub use models::{Activity, DayItinerary, TravelItinerary, TripRequest};
pub use tools::{ToolRegistry, get_weather_forecast};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripAgentError>;
