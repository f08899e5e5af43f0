//! Command-line interface: replay recorded responses through an episode.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregator::Collaborators;
use crate::config::{AppConfig, ConfigLoader};
use crate::dispatch::Dispatcher;
use crate::payload::Link;
use crate::render::{ErrorLog, RenderLog, RenderedView};
use crate::transport::{pump, ChannelTransport, DeliveryOrder, ScriptedResponse, ScriptedServer};

#[derive(Parser, Debug)]
#[command(name = "restview")]
#[command(about = "Assemble object views from asynchronously arriving REST responses")]
pub struct Cli {
    /// Workspace root holding an optional config/ directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Explicit configuration file (skips workspace and global files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,

    /// Override the configured log level
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one episode against recorded responses and print the view
    Replay {
        /// JSON fixture with the action link and responses by href
        fixture: PathBuf,

        /// Override the configured answer order
        #[arg(long, value_enum)]
        order: Option<DeliveryOrder>,
    },
    /// Print the effective configuration
    Config,
}

/// A recorded user action and the responses to every request it caused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub title: String,
    pub action: Link,
    #[serde(default)]
    pub responses: HashMap<String, ScriptedResponse>,
}

pub fn load_fixture(path: &Path) -> anyhow::Result<Fixture> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid fixture {}", path.display()))
}

/// Resolve configuration the same way for logging setup and execution.
pub fn load_config(workspace: &Path, config: Option<&Path>) -> anyhow::Result<AppConfig> {
    let loaded = match config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConfigLoader::load(workspace).context("Failed to load workspace config")?,
    };
    Ok(loaded.validated()?)
}

pub struct RunContext {
    config: AppConfig,
}

impl RunContext {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> anyhow::Result<String> {
        match command {
            Commands::Replay { fixture, order } => {
                let fixture = load_fixture(fixture)?;
                let order = order.unwrap_or(self.config.aggregation.delivery_order);
                Ok(self.replay(fixture, order))
            }
            Commands::Config => {
                toml::to_string_pretty(&self.config).context("Failed to render configuration")
            }
        }
    }

    /// Replay a fixture and describe the outcome.
    pub fn replay(&self, fixture: Fixture, order: DeliveryOrder) -> String {
        let (transport, queue) = ChannelTransport::new_pair();
        let views = Arc::new(RenderLog::default());
        let errors = Arc::new(ErrorLog::default());
        let collaborators = Collaborators {
            transport: Arc::new(transport),
            views: views.clone(),
            errors: errors.clone(),
        };
        let mut dispatcher =
            Dispatcher::new(collaborators, self.config.aggregation.collection_policy);
        let server = ScriptedServer::new(fixture.responses);

        let episode = dispatcher.open(fixture.title, &fixture.action);
        let report = pump(
            &mut dispatcher,
            &queue,
            &server,
            order,
            self.config.aggregation.max_deliveries,
        );
        info!(%episode, delivered = report.delivered, "Replay finished");

        let mut out = String::new();
        match views.views().first() {
            Some(view) => out.push_str(&format_view(view)),
            None => {
                out.push_str("Episode never became ready");
                if let Some(aggregator) = dispatcher.episode(episode) {
                    let pending: Vec<&str> = aggregator
                        .collections()
                        .filter(|c| !c.model().parented_collection_can_be_displayed())
                        .map(|c| c.key())
                        .collect();
                    out.push_str(&format!(
                        " (object displayable: {}, pending collections: [{}])",
                        aggregator.model().can_be_displayed(),
                        pending.join(", ")
                    ));
                }
            }
        }
        if report.exhausted {
            out.push_str("\nDelivery limit reached");
        }
        for failure in &report.failures {
            out.push_str(&format!("\nUpdate failed: {}", failure));
        }
        for error in errors.reports() {
            out.push_str(&format!(
                "\nRequest failed: {} {} ({})",
                error.status, error.url, error.message
            ));
        }
        out
    }
}

fn format_view(view: &RenderedView) -> String {
    let mut out = format!("{}\n", view.title);

    if let Some(object) = &view.object {
        let mut properties = Table::new();
        properties.set_header(vec!["Property", "Value"]);
        for property in &object.properties {
            let value = match &property.value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            properties.add_row(vec![property.id.clone(), value]);
        }
        out.push_str(&format!("{}\n{}\n", object.title, properties));
    }

    if !view.collections.is_empty() {
        let mut collections = Table::new();
        collections.set_header(vec!["Collection", "Listed", "Resolved"]);
        for summary in &view.collections {
            collections.add_row(vec![
                summary.key.clone(),
                summary.listed.to_string(),
                summary.resolved.to_string(),
            ]);
        }
        out.push_str(&format!("{}\n", collections));
    }
    out
}
