use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::{format_results, SearchBackend};

/// A tool as advertised to the chat backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A named capability the agent can invoke.
///
/// Tools never fail: whatever goes wrong is described in the returned text,
/// since the model reads tool output as-is.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parameters(&self) -> Value;
    async fn call(&self, arguments: &str) -> String;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry the assistant runs with: connectivity check and product search.
    #[must_use]
    pub fn catalog(backend: Arc<SearchBackend>) -> Self {
        Self::new()
            .register(EsStatus::new(backend.clone()))
            .register(SearchProducts::new(backend))
    }

    #[must_use]
    pub fn register(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(Box::new(tool));

        self
    }

    #[must_use]
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    pub async fn invoke(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = self.tools.iter().find(|tool| tool.name() == name) else {
            return format!("Unknown tool: {name}");
        };

        debug!("Invoking tool {name} with {arguments}");
        let output = tool.call(arguments).await;
        debug!("Tool {name} returned {} bytes", output.len());

        output
    }
}

pub struct EsStatus {
    backend: Arc<SearchBackend>,
}

impl EsStatus {
    #[must_use]
    pub const fn new(backend: Arc<SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for EsStatus {
    fn name(&self) -> &'static str {
        "es_status"
    }

    fn description(&self) -> &'static str {
        "Checks if Elasticsearch is connected."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _arguments: &str) -> String {
        self.backend.check_connectivity().await.to_string()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// What to look for in the product catalog.
    pub query: String,
    /// A single date (`YYYY-MM-DD`) or a range (`YYYY-MM-DD to YYYY-MM-DD`).
    pub date: Option<String>,
}

pub struct SearchProducts {
    backend: Arc<SearchBackend>,
}

impl SearchProducts {
    #[must_use]
    pub const fn new(backend: Arc<SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for SearchProducts {
    fn name(&self) -> &'static str {
        "search_products"
    }

    fn description(&self) -> &'static str {
        "Searches the product catalog. Takes a free-text query and an optional date or date range, and returns up to three matching products."
    }

    fn parameters(&self) -> Value {
        serde_json::to_value(schema_for!(SearchArgs)).unwrap_or_else(|_| json!({}))
    }

    async fn call(&self, arguments: &str) -> String {
        let args = match serde_json::from_str::<SearchArgs>(arguments) {
            Ok(args) => args,
            Err(err) => return format!("Invalid arguments for search_products: {err}"),
        };

        match self
            .backend
            .search_products(&args.query, args.date.as_deref())
            .await
        {
            Ok(products) => format_results(&products),
            Err(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NO_RESULTS;

    fn unavailable() -> Arc<SearchBackend> {
        Arc::new(SearchBackend::Unavailable {
            reason: "no endpoint".to_string(),
        })
    }

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echoes its arguments."
        }

        fn parameters(&self) -> Value {
            json!({})
        }

        async fn call(&self, arguments: &str) -> String {
            arguments.to_string()
        }
    }

    #[test]
    fn catalog_advertises_both_tools_in_order() {
        let specs = ToolRegistry::catalog(unavailable()).specs();

        assert_eq!(
            specs.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["es_status", "search_products"]
        );
        assert!(specs[1].parameters["properties"]["query"].is_object());
        assert!(specs[1].parameters["properties"]["date"].is_object());
    }

    #[test]
    fn registering_same_name_replaces() {
        let registry = ToolRegistry::new().register(Echo).register(Echo);

        assert_eq!(registry.specs().len(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_described() {
        let registry = ToolRegistry::new().register(Echo);

        assert_eq!(registry.invoke("nope", "{}").await, "Unknown tool: nope");
        assert_eq!(registry.invoke("echo", "hi").await, "hi");
    }

    #[tokio::test]
    async fn status_reports_uninitialized() {
        let registry = ToolRegistry::catalog(unavailable());

        assert_eq!(
            registry.invoke("es_status", "").await,
            "Elasticsearch client is not initialized."
        );
    }

    #[tokio::test]
    async fn search_errors_become_text() {
        let registry = ToolRegistry::catalog(unavailable());

        let invalid_date = registry
            .invoke(
                "search_products",
                r#"{"query": "fishing gear", "date": "a to b to c"}"#,
            )
            .await;
        assert!(invalid_date.starts_with("Invalid date format"));

        let uninitialized = registry
            .invoke("search_products", r#"{"query": "fishing gear"}"#)
            .await;
        assert_eq!(uninitialized, "Elasticsearch client is not initialized.");

        let malformed = registry.invoke("search_products", "not json").await;
        assert!(malformed.starts_with("Invalid arguments for search_products"));
    }

    #[tokio::test]
    async fn status_ignores_malformed_chat_settings() {
        use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let uri = server.uri();
        let config = crate::Config::from_lookup(|key| match key {
            "ELASTIC_CLOUD_ENDPOINT" => Some(uri.clone()),
            "ELASTIC_API_KEY" => Some("secret".to_string()),
            "AZURE_OPENAI_TEMPERATURE" => Some("warm".to_string()),
            _ => None,
        });
        let registry = ToolRegistry::catalog(Arc::new(SearchBackend::connect(&config.elastic)));

        assert_eq!(
            registry.invoke("es_status", "{}").await,
            crate::ConnectivityStatus::Connected.to_string()
        );
    }

    #[tokio::test]
    async fn empty_hits_render_sentinel() {
        use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": [] } })),
            )
            .mount(&server)
            .await;

        let backend = SearchBackend::connect(&crate::config::ElasticConfig {
            endpoint: Some(server.uri()),
            api_key: Some("secret".to_string()),
            index: "products".to_string(),
        });
        let registry = ToolRegistry::catalog(Arc::new(backend));

        assert_eq!(
            registry
                .invoke("search_products", r#"{"query": "tents"}"#)
                .await,
            NO_RESULTS
        );
    }
}
