//! Blocking HTTP client for the simulation and assistant endpoints.
//!
//! Calls are made from worker threads (see [`crate::dataflow::InFlight`]); nothing
//! here touches the UI.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::WorkbenchConfig;
use crate::error::{Result, ServiceError};
use crate::snapshot::CircuitSnapshot;

pub const SIMULATION_FAILURE_NOTICE: &str =
    "Failed to connect to the simulation server. Is it running?";
pub const CHAT_EMPTY_REPLY: &str = "Sorry, I received an empty response.";
pub const CHAT_FALLBACK_REPLY: &str =
    "Sorry, I was unable to connect to the AI service. Please check the server and try again.";

/// One recorded voltage trace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub time: Vec<f64>,
    #[serde(default)]
    pub voltage: Vec<f64>,
    #[serde(default)]
    pub color: String,
}

impl Trace {
    pub fn peak_voltage(&self) -> Option<f64> {
        self.voltage.iter().copied().reduce(f64::max)
    }
}

/// A spike at time `x` (ms) from cell index `y`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpikePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    #[serde(default)]
    pub traces: Vec<Trace>,
    #[serde(default)]
    pub spike_data: Vec<SpikePoint>,
}

impl SimulationResults {
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty() && self.spike_data.is_empty()
    }

    pub fn duration_ms(&self) -> Option<f64> {
        self.traces
            .iter()
            .filter_map(|trace| trace.time.last().copied())
            .reduce(f64::max)
    }

    pub fn summary(&self) -> String {
        let cells = {
            let mut ids: Vec<u64> = self.spike_data.iter().map(|p| p.y as u64).collect();
            ids.sort_unstable();
            ids.dedup();
            ids.len()
        };
        match self.duration_ms() {
            Some(ms) => format!(
                "{} traces over {ms:.0} ms, {} spikes from {cells} cells",
                self.traces.len(),
                self.spike_data.len()
            ),
            None => format!(
                "{} traces, {} spikes from {cells} cells",
                self.traces.len(),
                self.spike_data.len()
            ),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    message: &'a str,
    app_state: &'a CircuitSnapshot,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    reply: Option<String>,
}

/// Turn a raw `/chat` reply into the text shown to the user.
pub fn reply_text(reply: Option<String>) -> String {
    match reply {
        Some(text) if !text.is_empty() => text,
        _ => CHAT_EMPTY_REPLY.to_owned(),
    }
}

#[derive(Clone, Debug)]
pub struct SimulationClient {
    http: reqwest::blocking::Client,
    config: WorkbenchConfig,
}

impl SimulationClient {
    pub fn new(config: &WorkbenchConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    pub fn run_simulation(&self, snapshot: &CircuitSnapshot) -> Result<SimulationResults> {
        let _span = tracing::info_span!("run_simulation", mode = ?snapshot.mode()).entered();
        self.post("run_simulation", snapshot)
    }

    /// Ask the assistant about the current circuit. Empty replies become
    /// [`CHAT_EMPTY_REPLY`].
    pub fn ask_assistant(&self, message: &str, app_state: &CircuitSnapshot) -> Result<String> {
        let response: ChatResponse = self.post("chat", &ChatRequest { message, app_state })?;
        Ok(reply_text(response.reply))
    }

    fn post<B: Serialize + ?Sized, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let endpoint = self.config.endpoint(path);
        log::debug!("POST {endpoint}");
        let response = self.http.post(&endpoint).json(body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;
    use crate::population::PopulationModel;
    use crate::snapshot::Mode;

    #[test]
    fn missing_result_fields_default_to_empty() {
        let results: SimulationResults = serde_json::from_str("{}").unwrap();
        assert!(results.is_empty());

        let results: SimulationResults = serde_json::from_str(
            r##"{"traces":[{"label":"Principal Cell Soma","time":[0,0.025,100],"voltage":[-65,-64,20],"color":"#e6194b"}]}"##,
        )
        .unwrap();
        assert_eq!(results.traces[0].peak_voltage(), Some(20.0));
        assert!(results.spike_data.is_empty());
    }

    #[test]
    fn summary_counts_distinct_cells() {
        let results: SimulationResults = serde_json::from_str(
            r##"{"traces":[{"label":"a","time":[0,250],"voltage":[-65,-65],"color":"#000000"}],
                "spike_data":[{"x":10,"y":0},{"x":12,"y":3},{"x":40,"y":0}]}"##,
        )
        .unwrap();
        assert_eq!(results.summary(), "1 traces over 250 ms, 3 spikes from 2 cells");
        assert_eq!(
            SimulationResults::default().summary(),
            "0 traces, 0 spikes from 0 cells"
        );
    }

    #[test]
    fn chat_request_wire_shape() {
        let snapshot = CircuitSnapshot::capture(
            Mode::Individual,
            &Circuit::with_principal_cell(),
            &PopulationModel::default(),
        );
        let json = serde_json::to_value(ChatRequest {
            message: "what does GABA do?",
            app_state: &snapshot,
        })
        .unwrap();
        assert_eq!(json["message"], "what does GABA do?");
        assert_eq!(json["appState"]["mode"], "individual");
    }

    #[test]
    fn empty_replies_are_replaced() {
        assert_eq!(reply_text(None), CHAT_EMPTY_REPLY);
        assert_eq!(reply_text(Some(String::new())), CHAT_EMPTY_REPLY);
        assert_eq!(reply_text(Some("Hi".to_owned())), "Hi");
        let parsed: ChatResponse = serde_json::from_str(r#"{"reply":null}"#).unwrap();
        assert_eq!(reply_text(parsed.reply), CHAT_EMPTY_REPLY);
    }
}
