//! Itinerary planners
//!
//! [`Planner`] is the single entry point the front ends call. Two
//! implementations exist and are selected once at startup from configuration:
//! [`MockPlanner`] produces a fixed-shape offline itinerary, and
//! [`LiveModelPlanner`] runs the real prompt / tool-call / follow-up protocol
//! against the model service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::{PlannerMode, TripAgentConfig};
use crate::gemini::{Content, GeminiClient, GenerateRequest, ModelClient};
use crate::models::{Activity, DayItinerary, TravelItinerary, TripRequest};
use crate::tools::ToolRegistry;
use crate::{Result, TripAgentError};

/// Sentinel result fed back to the model when it calls a function that is
/// not registered
pub const TOOL_NOT_FOUND: &str = "Tool not found";

/// System instruction used by the live planner unless the caller overrides it
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a friendly, expert travel agent. \
    You must always check the weather with the available tool before generating the itinerary. \
    Your final output must strictly follow the requested JSON schema and be well-reasoned.";

/// Produces a travel itinerary for a trip request
#[async_trait]
pub trait Planner: Send + Sync {
    /// Plan a trip. Errors from the model service propagate unchanged; the
    /// front ends turn them into user-facing messages.
    async fn plan(&self, request: &TripRequest) -> Result<TravelItinerary>;
}

/// Select the planner implementation for this process
pub fn planner_for(config: &TripAgentConfig) -> Result<Box<dyn Planner>> {
    match config.resolved_planner_mode() {
        PlannerMode::Live => {
            tracing::info!(model = %config.model.model, "using live model planner");
            Ok(Box::new(LiveModelPlanner::from_config(config)?))
        }
        _ => {
            tracing::info!("using mock planner (no API key configured)");
            Ok(Box::new(MockPlanner))
        }
    }
}

/// Offline planner producing a fixed-shape itinerary without external calls
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPlanner;

const MOCK_WEATHER_CYCLE: [&str; 3] = ["Sunny", "Clear", "Partly Cloudy"];

impl MockPlanner {
    /// One day per calendar day in the requested range, or the raw start and
    /// end dates when they do not parse as YYYY-MM-DD
    fn trip_dates(request: &TripRequest) -> Vec<String> {
        let parsed = NaiveDate::parse_from_str(&request.start_date, "%Y-%m-%d")
            .and_then(|start| {
                NaiveDate::parse_from_str(&request.end_date, "%Y-%m-%d").map(|end| (start, end))
            })
            .ok()
            .filter(|(start, end)| start <= end);

        match parsed {
            Some((start, end)) => start
                .iter_days()
                .take_while(|date| *date <= end)
                .map(|date| date.format("%Y-%m-%d").to_string())
                .collect(),
            None => vec![request.start_date.clone(), request.end_date.clone()],
        }
    }

    fn day_for(request: &TripRequest, index: usize, date: String) -> DayItinerary {
        let interests = &request.interests;
        let first = &interests[index % interests.len()];
        let second = &interests[(index + 1) % interests.len()];

        DayItinerary {
            day: u32::try_from(index).unwrap_or(0) + 1,
            date,
            weather_summary: Some(MOCK_WEATHER_CYCLE[index % MOCK_WEATHER_CYCLE.len()].to_string()),
            activities: vec![
                Activity {
                    time_of_day: "Morning".to_string(),
                    description: format!("Explore {} highlights in {}", first, request.destination),
                    location: Some(request.destination.clone()),
                },
                Activity {
                    time_of_day: "Afternoon".to_string(),
                    description: format!("Spend the afternoon on {second}"),
                    location: None,
                },
                Activity {
                    time_of_day: "Evening".to_string(),
                    description: format!(
                        "Dinner at a local restaurant fitting a {} budget",
                        request.budget
                    ),
                    location: Some(request.destination.clone()),
                },
            ],
        }
    }
}

#[async_trait]
impl Planner for MockPlanner {
    async fn plan(&self, request: &TripRequest) -> Result<TravelItinerary> {
        let days = Self::trip_dates(request)
            .into_iter()
            .enumerate()
            .map(|(index, date)| Self::day_for(request, index, date))
            .collect();

        Ok(TravelItinerary {
            destination: request.destination.clone(),
            forecast: "Mock Forecast: Sunny and pleasant.".to_string(),
            days,
        })
    }
}

/// Planner that drives the model service with optional one-level tool calling
pub struct LiveModelPlanner {
    client: Arc<dyn ModelClient>,
    tools: ToolRegistry,
    system_instruction: Option<String>,
}

impl LiveModelPlanner {
    /// Build a planner over an arbitrary model client.
    ///
    /// The tool registry and system instruction are fixed at construction;
    /// nothing is read from the environment afterwards.
    pub fn new(
        client: Arc<dyn ModelClient>,
        tools: ToolRegistry,
        system_instruction: Option<String>,
    ) -> Self {
        Self {
            client,
            tools,
            system_instruction,
        }
    }

    /// Build the live planner from configuration, with the built-in weather
    /// tool and default system instruction
    pub fn from_config(config: &TripAgentConfig) -> Result<Self> {
        let client = GeminiClient::new(&config.model)?;
        Ok(Self::new(
            Arc::new(client),
            ToolRegistry::with_builtin_tools(),
            Some(DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        ))
    }

    fn build_prompt(request: &TripRequest) -> String {
        format!(
            "Plan a trip to {} from {} to {}.\n\
             The traveler has a {} budget and is interested in: {}.\n\n\
             First, check the weather for the destination during the trip dates using the available tool.\n\
             Then, create a day-by-day itinerary that fits the budget and interests, and takes the weather into account.",
            request.destination,
            request.start_date,
            request.end_date,
            request.budget,
            request.interests.join(", ")
        )
    }

    fn generate_request(&self, contents: Vec<Content>, with_tools: bool) -> GenerateRequest {
        GenerateRequest {
            contents,
            tools: if with_tools {
                self.tools.declarations().to_vec()
            } else {
                Vec::new()
            },
            system_instruction: self.system_instruction.clone(),
            response_schema: TravelItinerary::response_schema(),
        }
    }
}

#[async_trait]
impl Planner for LiveModelPlanner {
    async fn plan(&self, request: &TripRequest) -> Result<TravelItinerary> {
        let prompt = Self::build_prompt(request);
        tracing::debug!(destination = %request.destination, "submitting planning prompt");

        let mut contents = vec![Content::user_text(&prompt)];
        let first = self
            .client
            .generate(self.generate_request(contents.clone(), true))
            .await?;

        // At most one tool round trip; the second response is always final.
        let final_response = if let Some(call) = first.function_call().cloned() {
            let result = match self.tools.resolve(&call.name) {
                Some(handler) => {
                    tracing::info!(tool = %call.name, "executing tool requested by model");
                    handler(&call.args)?
                }
                None => {
                    tracing::warn!(tool = %call.name, "model called an unregistered tool");
                    TOOL_NOT_FOUND.to_string()
                }
            };

            contents.push(first.content);
            contents.push(Content::function_result(&call.name, result));

            self.client
                .generate(self.generate_request(contents, false))
                .await?
        } else {
            first
        };

        let text = final_response
            .text()
            .ok_or_else(|| TripAgentError::api("model response contained no text to decode"))?;

        let itinerary: TravelItinerary = serde_json::from_str(&text)?;
        Ok(itinerary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::{FunctionCall, ModelResponse, Part};
    use crate::tools::{FunctionDeclaration, WEATHER_TOOL_NAME};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted model client: pops canned responses and records every request
    struct ScriptedClient {
        responses: Mutex<VecDeque<ModelResponse>>,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<ModelResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> GenerateRequest {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn generate(&self, request: GenerateRequest) -> Result<ModelResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TripAgentError::api("scripted client exhausted"))
        }
    }

    fn text_response(text: &str) -> ModelResponse {
        ModelResponse {
            content: Content {
                role: "model".to_string(),
                parts: vec![Part {
                    text: Some(text.to_string()),
                    ..Part::default()
                }],
            },
        }
    }

    fn function_call_response(name: &str, args: serde_json::Value) -> ModelResponse {
        ModelResponse {
            content: Content {
                role: "model".to_string(),
                parts: vec![Part {
                    function_call: Some(FunctionCall {
                        name: name.to_string(),
                        args,
                    }),
                    ..Part::default()
                }],
            },
        }
    }

    fn itinerary_json(destination: &str) -> String {
        json!({
            "destination": destination,
            "forecast": "Sunny with light wind",
            "days": [{
                "day": 1,
                "date": "2024-06-01",
                "activities": [{
                    "time_of_day": "Morning",
                    "description": "City walking tour"
                }]
            }]
        })
        .to_string()
    }

    fn sample_request() -> TripRequest {
        TripRequest::new(
            "San Francisco",
            "2024-06-01",
            "2024-06-02",
            vec!["food".to_string(), "sightseeing".to_string()],
            "moderate",
        )
        .unwrap()
    }

    fn function_response_payload(request: &GenerateRequest) -> String {
        request
            .contents
            .iter()
            .flat_map(|content| &content.parts)
            .find_map(|part| part.function_response.as_ref())
            .map(|fr| fr.response["result"].as_str().unwrap().to_string())
            .expect("follow-up request carries a function response")
    }

    #[tokio::test]
    async fn test_direct_answer_needs_single_round() {
        let client = ScriptedClient::new(vec![text_response(&itinerary_json("San Francisco"))]);
        let planner = LiveModelPlanner::new(
            client.clone(),
            ToolRegistry::with_builtin_tools(),
            Some(DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        );

        let itinerary = planner.plan(&sample_request()).await.unwrap();
        assert_eq!(itinerary.destination, "San Francisco");
        assert_eq!(client.request_count(), 1);

        // First round declares the weather tool and the schema constraint.
        let first = client.request(0);
        assert_eq!(first.tools[0].name, WEATHER_TOOL_NAME);
        assert_eq!(first.response_schema["type"], "OBJECT");
        let prompt = first.contents[0].parts[0].text.clone().unwrap();
        assert!(prompt.contains("San Francisco"));
        assert!(prompt.contains("moderate"));
        assert!(prompt.contains("food, sightseeing"));
    }

    #[tokio::test]
    async fn test_tool_round_trip_executes_exactly_once() {
        let executions = Arc::new(AtomicUsize::new(0));
        let counter = executions.clone();

        let mut tools = ToolRegistry::new();
        tools.register(
            FunctionDeclaration {
                name: WEATHER_TOOL_NAME.to_string(),
                description: "weather".to_string(),
                parameters: json!({"type": "OBJECT", "properties": {}}),
            },
            Arc::new(move |args| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(format!(
                    "Forecast for {} on {}: Sunny, 20°C",
                    args["location"].as_str().unwrap_or("?"),
                    args["date"].as_str().unwrap_or("?")
                ))
            }),
        );

        let client = ScriptedClient::new(vec![
            function_call_response(
                WEATHER_TOOL_NAME,
                json!({"location": "San Francisco", "date": "2024-06-01"}),
            ),
            text_response(&itinerary_json("San Francisco")),
        ]);
        let planner = LiveModelPlanner::new(client.clone(), tools, None);

        let itinerary = planner.plan(&sample_request()).await.unwrap();
        assert_eq!(itinerary.destination, "San Francisco");
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert_eq!(client.request_count(), 2);

        // Follow-up carries prompt, the model's call and the tool result,
        // in that order, and declares no further tools.
        let follow_up = client.request(1);
        assert_eq!(follow_up.contents.len(), 3);
        assert!(follow_up.contents[1].parts[0].function_call.is_some());
        assert!(follow_up.tools.is_empty());
        assert!(function_response_payload(&follow_up).starts_with("Forecast for San Francisco"));
    }

    #[tokio::test]
    async fn test_unknown_tool_degrades_to_sentinel() {
        let client = ScriptedClient::new(vec![
            function_call_response("get_current_weather", json!({"city": "Rome"})),
            text_response(&itinerary_json("Rome")),
        ]);
        let planner = LiveModelPlanner::new(
            client.clone(),
            ToolRegistry::with_builtin_tools(),
            None,
        );

        let mut request = sample_request();
        request.destination = "Rome".to_string();
        let itinerary = planner.plan(&request).await.unwrap();

        assert_eq!(itinerary.destination, "Rome");
        assert_eq!(client.request_count(), 2);
        assert_eq!(function_response_payload(&client.request(1)), TOOL_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_second_function_call_is_not_honored() {
        let client = ScriptedClient::new(vec![
            function_call_response(WEATHER_TOOL_NAME, json!({"location": "X", "date": "Y"})),
            function_call_response(WEATHER_TOOL_NAME, json!({"location": "X", "date": "Z"})),
        ]);
        let planner = LiveModelPlanner::new(
            client.clone(),
            ToolRegistry::with_builtin_tools(),
            None,
        );

        let result = planner.plan(&sample_request()).await;
        assert!(matches!(result, Err(TripAgentError::Api { .. })));
        // No third round trip.
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_malformed_final_response_is_decode_error() {
        let client = ScriptedClient::new(vec![text_response("this is not an itinerary")]);
        let planner = LiveModelPlanner::new(
            client.clone(),
            ToolRegistry::with_builtin_tools(),
            None,
        );

        let result = planner.plan(&sample_request()).await;
        assert!(matches!(result, Err(TripAgentError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_model_failure_propagates_unchanged() {
        let client = ScriptedClient::new(vec![]);
        let planner = LiveModelPlanner::new(
            client.clone(),
            ToolRegistry::with_builtin_tools(),
            None,
        );

        let result = planner.plan(&sample_request()).await;
        assert!(matches!(result, Err(TripAgentError::Api { .. })));
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_planner_end_to_end_scenario() {
        let itinerary = MockPlanner.plan(&sample_request()).await.unwrap();

        assert_eq!(itinerary.destination, "San Francisco");
        assert!(itinerary.forecast.contains("Mock Forecast"));
        assert_eq!(itinerary.days.len(), 2);
        for (index, day) in itinerary.days.iter().enumerate() {
            assert_eq!(day.day, u32::try_from(index).unwrap() + 1);
            assert_eq!(day.activities.len(), 3);
        }
        assert_eq!(itinerary.days[0].date, "2024-06-01");
        assert_eq!(itinerary.days[1].date, "2024-06-02");
        assert_eq!(itinerary.days[0].activities[0].time_of_day, "Morning");
        assert_eq!(itinerary.days[0].activities[2].time_of_day, "Evening");
    }

    #[tokio::test]
    async fn test_mock_planner_expands_longer_ranges() {
        let request = TripRequest::new(
            "Lisbon",
            "2024-09-10",
            "2024-09-14",
            vec!["surfing".to_string()],
            "budget",
        )
        .unwrap();

        let itinerary = MockPlanner.plan(&request).await.unwrap();
        assert_eq!(itinerary.days.len(), 5);
        assert_eq!(itinerary.days[4].date, "2024-09-14");
        assert_eq!(itinerary.days[4].day, 5);
    }

    #[tokio::test]
    async fn test_mock_planner_falls_back_on_unparseable_dates() {
        let request = TripRequest::new(
            "Lisbon",
            "next monday",
            "next friday",
            vec!["surfing".to_string()],
            "budget",
        )
        .unwrap();

        let itinerary = MockPlanner.plan(&request).await.unwrap();
        assert_eq!(itinerary.days.len(), 2);
        assert_eq!(itinerary.days[0].date, "next monday");
        assert_eq!(itinerary.days[1].date, "next friday");
    }

    #[test]
    fn test_planner_selection_from_config() {
        let config = TripAgentConfig::default();
        assert!(planner_for(&config).is_ok());

        let mut live = TripAgentConfig::default();
        live.model.api_key = Some("valid_api_key_123".to_string());
        live.planner.mode = PlannerMode::Live;
        assert!(planner_for(&live).is_ok());
    }
}
