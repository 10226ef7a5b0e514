//! Property search filters and the debounced pipeline that turns filter
//! edits into property list fetches.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::Backend;
use crate::cache::{EntityKind, Tag};
use crate::models::PropertyWithDetails;
use crate::service::EstateService;
use crate::validation::ValidationError;

/// Quiet period after the last filter edit before a fetch is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Search criteria for `GET /Property`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilters {
    pub name: Option<String>,
    pub address: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl PropertyFilters {
    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }

    /// Query parameters for the list endpoint. Blank text filters are
    /// dropped; prices are sent whenever present, zero included.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(name) = non_blank(&self.name) {
            query.push(("Name".to_string(), name.to_string()));
        }
        if let Some(address) = non_blank(&self.address) {
            query.push(("Address".to_string(), address.to_string()));
        }
        if let Some(min) = self.min_price {
            query.push(("MinPrice".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            query.push(("MaxPrice".to_string(), max.to_string()));
        }
        query
    }
}

fn parse_price(field: &str, value: &str) -> Result<f64, ValidationError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| ValidationError::field(field, format!("not a valid price: {:?}", value)))
}

/// Parses `name=..;address=..;min=..;max=..`. Missing or empty entries
/// leave that filter unset.
impl FromStr for PropertyFilters {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut filters = PropertyFilters::default();
        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| ValidationError::field(entry, "expected key=value"))?;
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim().to_lowercase().as_str() {
                "name" => filters.name = Some(value.to_string()),
                "address" => filters.address = Some(value.to_string()),
                "min" | "minprice" | "min_price" => filters.min_price = Some(parse_price("min", value)?),
                "max" | "maxprice" | "max_price" => filters.max_price = Some(parse_price("max", value)?),
                other => return Err(ValidationError::field(other, "unknown filter")),
            }
        }
        Ok(filters)
    }
}

/// Forwards only the latest value once its input has been quiet for `delay`.
///
/// Dropping the debouncer flushes a pending value immediately.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn spawn(delay: Duration, output: mpsc::UnboundedSender<T>) -> Self {
        let (input, rx) = mpsc::unbounded_channel();
        tokio::spawn(debounce(delay, rx, output));
        Self { input }
    }

    /// Returns false once the output side has gone away.
    pub fn push(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }
}

async fn debounce<T>(delay: Duration, mut input: mpsc::UnboundedReceiver<T>, output: mpsc::UnboundedSender<T>) {
    let mut pending: Option<T> = None;
    loop {
        let Some(value) = pending.take() else {
            match input.recv().await {
                Some(value) => {
                    pending = Some(value);
                    continue;
                }
                None => return,
            }
        };

        tokio::select! {
            received = input.recv() => match received {
                Some(newer) => pending = Some(newer),
                None => {
                    let _ = output.send(value);
                    return;
                }
            },
            _ = tokio::time::sleep(delay) => {
                if output.send(value).is_err() {
                    return;
                }
            }
        }
    }
}

/// Latest result of the property list behind a filter pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub properties: Vec<PropertyWithDetails>,
    pub loading: bool,
    pub error: Option<String>,
    pub total_count: usize,
    /// Filters the current `properties` were fetched with.
    pub filters: PropertyFilters,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            loading: true,
            error: None,
            total_count: 0,
            filters: PropertyFilters::default(),
        }
    }
}

impl ListState {
    /// A new fetch hides the previous failure until it settles.
    fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }
}

#[derive(Debug)]
enum Command {
    Fetch(PropertyFilters),
    Refetch,
}

/// Debounced filter edits in, property list states out.
pub struct FilterPipeline {
    debouncer: Option<Debouncer<Command>>,
    immediate: Option<mpsc::UnboundedSender<Command>>,
    state: watch::Receiver<ListState>,
    task: Option<JoinHandle<()>>,
}

impl FilterPipeline {
    /// Start the pipeline. `initial` is fetched right away.
    pub fn spawn<B: Backend>(service: EstateService<B>, initial: PropertyFilters, delay: Duration) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ListState::default());

        let _ = commands_tx.send(Command::Fetch(initial));
        let task = tokio::spawn(run_pipeline(service, commands_rx, state_tx));

        Self {
            debouncer: Some(Debouncer::spawn(delay, commands_tx.clone())),
            immediate: Some(commands_tx),
            state: state_rx,
            task: Some(task),
        }
    }

    pub fn set_filters(&self, filters: PropertyFilters) {
        if let Some(ref debouncer) = self.debouncer {
            debouncer.push(Command::Fetch(filters));
        }
    }

    /// Fetch the unfiltered list again, without waiting for the debounce.
    pub fn refetch(&self) {
        if let Some(ref tx) = self.immediate {
            let _ = tx.send(Command::Refetch);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.clone()
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Flush any pending edit, wait for the last fetch, and return the final state.
    pub async fn close(mut self) -> ListState {
        self.debouncer.take();
        self.immediate.take();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.state()
    }
}

impl Drop for FilterPipeline {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_pipeline<B: Backend>(
    service: EstateService<B>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<ListState>,
) {
    while let Some(command) = commands.recv().await {
        let filters = match command {
            Command::Fetch(filters) => filters,
            Command::Refetch => {
                service.cache().invalidate(&[Tag::Kind(EntityKind::Property)]).await;
                PropertyFilters::default()
            }
        };
        debug!(filters = ?filters, "Fetching properties");
        state.send_modify(ListState::begin_fetch);

        match service.properties(&filters).await {
            Ok(properties) => {
                state.send_replace(ListState {
                    total_count: properties.len(),
                    properties,
                    loading: false,
                    error: None,
                    filters,
                });
            }
            Err(e) => state.send_modify(|s| {
                s.loading = false;
                s.error = Some(e.to_string());
                s.filters = filters;
            }),
        }
    }
}
