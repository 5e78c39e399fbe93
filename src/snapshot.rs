//! What gets sent to the server: the active mode and only that mode's entities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, Connection, Neuron, Probe, Stimulator};
use crate::population::{
    ConnectionStrategy, Population, PopulationModel, ProbabilisticProbe, StimulationStrategy,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Individual,
    Probabilistic,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Individual => "Individual Neurons",
            Mode::Probabilistic => "Probabilistic Populations",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum CircuitSnapshot {
    Individual {
        neurons: Vec<Neuron>,
        connections: Vec<Connection>,
        stimulators: Vec<Stimulator>,
        probes: Vec<Probe>,
    },
    Probabilistic {
        populations: Vec<Population>,
        connection_strategies: Vec<ConnectionStrategy>,
        stimulation_strategies: Vec<StimulationStrategy>,
        probabilistic_probes: Vec<ProbabilisticProbe>,
    },
}

impl CircuitSnapshot {
    pub fn capture(mode: Mode, circuit: &Circuit, populations: &PopulationModel) -> Self {
        match mode {
            Mode::Individual => CircuitSnapshot::Individual {
                neurons: circuit.neurons().to_vec(),
                connections: circuit.connections().to_vec(),
                stimulators: circuit.stimulators().to_vec(),
                probes: circuit.probes().to_vec(),
            },
            Mode::Probabilistic => CircuitSnapshot::Probabilistic {
                populations: populations.populations().to_vec(),
                connection_strategies: populations.connection_strategies().to_vec(),
                stimulation_strategies: populations.stimulation_strategies().to_vec(),
                probabilistic_probes: populations.probes().to_vec(),
            },
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            CircuitSnapshot::Individual { .. } => Mode::Individual,
            CircuitSnapshot::Probabilistic { .. } => Mode::Probabilistic,
        }
    }
}

impl fmt::Display for CircuitSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitSnapshot::Individual {
                neurons,
                connections,
                stimulators,
                probes,
            } => write!(
                f,
                "{} neurons, {} connections, {} stimulators, {} probes",
                neurons.len(),
                connections.len(),
                stimulators.len(),
                probes.len()
            ),
            CircuitSnapshot::Probabilistic {
                populations,
                connection_strategies,
                stimulation_strategies,
                probabilistic_probes,
            } => write!(
                f,
                "{} populations, {} connection rules, {} stimulation rules, {} recording rules",
                populations.len(),
                connection_strategies.len(),
                stimulation_strategies.len(),
                probabilistic_probes.len()
            ),
        }
    }
}
