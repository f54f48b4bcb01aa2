//! Function tools the model may invoke while planning
//!
//! Tools are registered explicitly by name: the registry maps a function name
//! to its wire declaration plus a local handler. The agent never matches
//! model-supplied names against anything other than this registry.

use std::collections::HashMap;
use std::sync::Arc;

use rand::RngExt;
use serde::Serialize;
use serde_json::{Value, json};

use crate::Result;

/// Name of the built-in weather tool, as declared to the model
pub const WEATHER_TOOL_NAME: &str = "get_weather_forecast";

const WEATHER_CONDITIONS: [&str; 5] = ["Sunny", "Cloudy", "Rainy", "Partly Cloudy", "Windy"];
const TEMP_RANGE_CELSIUS: (i32, i32) = (15, 30);

/// Mock weather forecast for a location and date.
///
/// The condition and temperature are random draws; only the textual shape and
/// the temperature bounds are stable. Always succeeds.
#[must_use]
pub fn get_weather_forecast(location: &str, date: &str) -> String {
    let mut rng = rand::rng();
    let condition = WEATHER_CONDITIONS[rng.random_range(0..WEATHER_CONDITIONS.len())];
    let temp = rng.random_range(TEMP_RANGE_CELSIUS.0..=TEMP_RANGE_CELSIUS.1);

    format!("Forecast for {location} on {date}: {condition}, {temp}°C")
}

/// Declaration of a callable function, in the shape the model service expects
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    /// Function name the model will call back with
    pub name: String,
    /// What the function does, for the model's tool selection
    pub description: String,
    /// JSON schema of the function's parameters
    pub parameters: Value,
}

/// Handler executed locally when the model calls the matching function.
///
/// Receives the model-supplied arguments object verbatim; may perform I/O.
pub type ToolHandler = Arc<dyn Fn(&Value) -> Result<String> + Send + Sync>;

/// Explicit name-to-function registry for model-invocable tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    declarations: Vec<FunctionDeclaration>,
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    /// Empty registry; the model is offered no tools
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in weather tool pre-registered
    #[must_use]
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(
            FunctionDeclaration {
                name: WEATHER_TOOL_NAME.to_string(),
                description: "Get the weather forecast for a location on a given date."
                    .to_string(),
                parameters: json!({
                    "type": "OBJECT",
                    "properties": {
                        "location": {
                            "type": "STRING",
                            "description": "The city to get the forecast for."
                        },
                        "date": {
                            "type": "STRING",
                            "description": "The date of the forecast in YYYY-MM-DD format."
                        }
                    },
                    "required": ["location", "date"]
                }),
            },
            Arc::new(|args| {
                let location = args["location"].as_str().unwrap_or("Unknown");
                let date = args["date"].as_str().unwrap_or("Unknown");
                Ok(get_weather_forecast(location, date))
            }),
        );
        registry
    }

    /// Register a tool under its declared name, replacing any previous
    /// registration with the same name
    pub fn register(&mut self, declaration: FunctionDeclaration, handler: ToolHandler) {
        self.handlers.insert(declaration.name.clone(), handler);
        self.declarations
            .retain(|existing| existing.name != declaration.name);
        self.declarations.push(declaration);
    }

    /// Declarations in registration order, for the model request
    #[must_use]
    pub fn declarations(&self) -> &[FunctionDeclaration] {
        &self.declarations
    }

    /// Look up the handler for a model-supplied function name
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ToolHandler> {
        self.handlers.get(name).cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field(
                "tools",
                &self
                    .declarations
                    .iter()
                    .map(|d| d.name.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
