//! Data models for trip planning requests and itineraries
//!
//! This module contains the request shape collected by the front ends and the
//! structured itinerary shape the model is constrained to produce.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{Result, TripAgentError};

/// Conventional budget tiers offered by the web form.
///
/// The request itself keeps budget as free text; these are suggestions,
/// not a validated enum.
pub const BUDGET_LEVELS: [&str; 3] = ["budget", "moderate", "luxury"];

/// A trip planning request as collected from the CLI or web form
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TripRequest {
    /// The city and country the traveler wants to visit
    pub destination: String,
    /// Start date of the trip (YYYY-MM-DD)
    pub start_date: String,
    /// End date of the trip (YYYY-MM-DD)
    pub end_date: String,
    /// Ordered list of traveler interests (e.g. museums, food, hiking)
    pub interests: Vec<String>,
    /// Budget level (e.g. budget, moderate, luxury)
    pub budget: String,
}

impl TripRequest {
    /// Build a request, rejecting empty required fields.
    ///
    /// Beyond non-emptiness no validation is applied; dates stay textual and
    /// budget stays free text.
    pub fn new(
        destination: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        interests: Vec<String>,
        budget: impl Into<String>,
    ) -> Result<Self> {
        let request = Self {
            destination: destination.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            interests,
            budget: budget.into(),
        };
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<()> {
        if self.destination.trim().is_empty() {
            return Err(TripAgentError::validation("destination cannot be empty"));
        }
        if self.start_date.trim().is_empty() {
            return Err(TripAgentError::validation("start date cannot be empty"));
        }
        if self.end_date.trim().is_empty() {
            return Err(TripAgentError::validation("end date cannot be empty"));
        }
        if self.interests.is_empty() || self.interests.iter().all(|i| i.trim().is_empty()) {
            return Err(TripAgentError::validation(
                "at least one interest is required",
            ));
        }
        if self.budget.trim().is_empty() {
            return Err(TripAgentError::validation("budget cannot be empty"));
        }
        Ok(())
    }
}

/// A single activity within a day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Activity {
    /// Time of day (Morning, Afternoon, Evening)
    pub time_of_day: String,
    /// Description of the activity
    pub description: String,
    /// Location of the activity, if the model provided one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One day of the trip with its ordered activities
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayItinerary {
    /// Day number of the trip (1-based, assigned by the producer)
    pub day: u32,
    /// Date of the day's activities (YYYY-MM-DD)
    pub date: String,
    /// Ordered list of activities for the day
    pub activities: Vec<Activity>,
    /// Brief weather summary for this day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_summary: Option<String>,
}

/// The structured day-by-day travel plan returned to the user
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TravelItinerary {
    /// The destination of the trip, echoed from the request
    pub destination: String,
    /// Overall weather forecast summary for the trip
    pub forecast: String,
    /// Day-by-day itinerary, in chronological order
    pub days: Vec<DayItinerary>,
}

impl TravelItinerary {
    /// JSON schema the model's final response is constrained to.
    ///
    /// Uses the Gemini `responseSchema` dialect (OpenAPI subset with
    /// upper-case type names). Property order mirrors the struct fields.
    #[must_use]
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "destination": {
                    "type": "STRING",
                    "description": "The destination of the trip."
                },
                "forecast": {
                    "type": "STRING",
                    "description": "Overall weather forecast summary for the trip."
                },
                "days": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "day": {
                                "type": "INTEGER",
                                "description": "Day number of the trip, starting at 1."
                            },
                            "date": {
                                "type": "STRING",
                                "description": "Date of the day's activities in YYYY-MM-DD format."
                            },
                            "activities": {
                                "type": "ARRAY",
                                "items": {
                                    "type": "OBJECT",
                                    "properties": {
                                        "time_of_day": {
                                            "type": "STRING",
                                            "description": "Time of day (Morning, Afternoon, Evening)."
                                        },
                                        "description": {
                                            "type": "STRING",
                                            "description": "Description of the activity."
                                        },
                                        "location": {
                                            "type": "STRING",
                                            "description": "Location of the activity."
                                        }
                                    },
                                    "required": ["time_of_day", "description"]
                                }
                            },
                            "weather_summary": {
                                "type": "STRING",
                                "description": "Brief weather summary for this day."
                            }
                        },
                        "required": ["day", "date", "activities"]
                    }
                }
            },
            "required": ["destination", "forecast", "days"]
        })
    }

    /// Render the itinerary as formatted text for the CLI
    #[must_use]
    pub fn format_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Itinerary for {}\n", self.destination));
        out.push_str(&format!("Forecast: {}\n", self.forecast));

        for day in &self.days {
            out.push('\n');
            out.push_str(&format!("Day {}: {}\n", day.day, day.date));
            if let Some(weather) = &day.weather_summary {
                out.push_str(&format!("  Weather: {weather}\n"));
            }
            for activity in &day.activities {
                out.push_str(&format!(
                    "  {}: {}\n",
                    activity.time_of_day, activity.description
                ));
                if let Some(location) = &activity.location {
                    out.push_str(&format!("    Location: {location}\n"));
                }
            }
        }
        out
    }
}
