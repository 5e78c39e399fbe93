//! Circuit data for individual mode: neurons, synaptic connections, stimulators and probes.
//!
//! All mutation goes through [`Circuit`], which keeps the referential invariants:
//! every anchor points at an existing neuron and at a section that neuron actually has.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::clamp_position;
use crate::themes::{distinct_color, HexColor};

/// Normalized position used for anything anchored on the soma.
pub const SOMA_POSITION: f32 = 0.5;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(::uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}
pub(crate) use entity_id;

entity_id!(NeuronId);
entity_id!(ConnectionId);
entity_id!(StimulatorId);
entity_id!(ProbeId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "Soma")]
    Soma,
    #[serde(rename = "Apical Dendrite")]
    Apical,
    #[serde(rename = "Basal Dendrite")]
    Basal,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Soma, Section::Apical, Section::Basal];

    pub fn label(self) -> &'static str {
        match self {
            Section::Soma => "Soma",
            Section::Apical => "Apical Dendrite",
            Section::Basal => "Basal Dendrite",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynapseType {
    #[serde(rename = "AMPA")]
    Ampa,
    #[serde(rename = "GABA")]
    Gaba,
}

impl SynapseType {
    pub fn label(self) -> &'static str {
        match self {
            SynapseType::Ampa => "AMPA",
            SynapseType::Gaba => "GABA",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StimType {
    #[serde(rename = "AMPA")]
    Ampa,
    #[serde(rename = "GABA")]
    Gaba,
    IClamp,
}

impl StimType {
    pub const ALL: [StimType; 3] = [StimType::Ampa, StimType::Gaba, StimType::IClamp];

    pub fn label(self) -> &'static str {
        match self {
            StimType::Ampa => "AMPA",
            StimType::Gaba => "GABA",
            StimType::IClamp => "IClamp",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Morphology {
    pub soma_diam: f32,
    pub include_apical: bool,
    pub apical_l: f32,
    pub apical_diam: f32,
    pub include_basal: bool,
    pub basal_l: f32,
    pub basal_diam: f32,
}

impl Default for Morphology {
    fn default() -> Self {
        Self {
            soma_diam: 20.0,
            include_apical: true,
            apical_l: 400.0,
            apical_diam: 2.0,
            include_basal: true,
            basal_l: 200.0,
            basal_diam: 2.0,
        }
    }
}

impl Morphology {
    pub fn soma_radius(&self) -> f32 {
        self.soma_diam / 2.0
    }

    /// Whether `section` exists on this cell. The soma always does.
    pub fn includes(&self, section: Section) -> bool {
        match section {
            Section::Soma => true,
            Section::Apical => self.include_apical,
            Section::Basal => self.include_basal,
        }
    }

    /// Anatomical length of a dendrite; zero for the soma.
    pub fn length(&self, section: Section) -> f32 {
        match section {
            Section::Soma => 0.0,
            Section::Apical => self.apical_l,
            Section::Basal => self.basal_l,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: NeuronId,
    pub name: String,
    pub morphology: Morphology,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub source_id: NeuronId,
    pub target_id: NeuronId,
    pub synapse_type: SynapseType,
    pub target_section: Section,
    pub position: f32,
    pub weight: f32,
    pub delay: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stimulator {
    pub id: StimulatorId,
    pub target_id: NeuronId,
    pub stim_type: StimType,
    pub target_section: Section,
    pub position: f32,
    pub weight: f32,
    pub delay: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    pub id: ProbeId,
    pub target_id: NeuronId,
    pub section: Section,
    pub position: f32,
    pub color: HexColor,
}

/// Bring a (section, position) pair back into its valid domain for `morphology`.
///
/// Missing dendrites collapse onto the soma, soma anchors sit at the midpoint and
/// every other position is clamped to `[0, 1]`.
pub fn normalize_anchor(morphology: &Morphology, section: &mut Section, position: &mut f32) {
    if !morphology.includes(*section) {
        *section = Section::Soma;
    }
    *position = match section {
        Section::Soma => SOMA_POSITION,
        _ => clamp_position(*position),
    };
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circuit {
    neurons: Vec<Neuron>,
    connections: Vec<Connection>,
    stimulators: Vec<Stimulator>,
    probes: Vec<Probe>,
    selected: Option<NeuronId>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// The starting circuit of a fresh workbench: one selected principal cell.
    pub fn with_principal_cell() -> Self {
        let mut circuit = Self::new();
        circuit.push_neuron("Principal Cell", Morphology::default());
        circuit
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn stimulators(&self) -> &[Stimulator] {
        &self.stimulators
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.iter().find(|n| n.id == id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn stimulator(&self, id: StimulatorId) -> Option<&Stimulator> {
        self.stimulators.iter().find(|s| s.id == id)
    }

    pub fn probe(&self, id: ProbeId) -> Option<&Probe> {
        self.probes.iter().find(|p| p.id == id)
    }

    pub fn selected(&self) -> Option<NeuronId> {
        self.selected
    }

    pub fn selected_neuron(&self) -> Option<&Neuron> {
        self.selected.and_then(|id| self.neuron(id))
    }

    pub fn select(&mut self, id: NeuronId) {
        if self.neuron(id).is_some() {
            self.selected = Some(id);
        }
    }

    /// Add a default neuron named after its position in the list and select it.
    pub fn add_neuron(&mut self) -> NeuronId {
        let name = format!("Neuron {}", self.neurons.len() + 1);
        self.push_neuron(name, Morphology::default())
    }

    pub fn push_neuron(&mut self, name: impl Into<String>, morphology: Morphology) -> NeuronId {
        let id = NeuronId::new();
        self.neurons.push(Neuron {
            id,
            name: name.into(),
            morphology,
        });
        self.selected = Some(id);
        log::debug!("added neuron {id}");
        id
    }

    pub fn rename_neuron(&mut self, id: NeuronId, name: impl Into<String>) {
        if let Some(neuron) = self.neurons.iter_mut().find(|n| n.id == id) {
            neuron.name = name.into();
        }
    }

    /// Remove a neuron together with everything that references it.
    pub fn remove_neuron(&mut self, id: NeuronId) -> bool {
        let before = self.neurons.len();
        self.neurons.retain(|n| n.id != id);
        if self.neurons.len() == before {
            return false;
        }

        self.connections
            .retain(|c| c.source_id != id && c.target_id != id);
        self.stimulators.retain(|s| s.target_id != id);
        self.probes.retain(|p| p.target_id != id);

        if self.selected == Some(id) {
            self.selected = self.neurons.first().map(|n| n.id);
        }
        log::debug!("removed neuron {id} and its dependents");
        true
    }

    /// Edit a neuron's morphology, then re-anchor anything sitting on a section that
    /// no longer exists.
    pub fn update_morphology(&mut self, id: NeuronId, edit: impl FnOnce(&mut Morphology)) {
        let Some(neuron) = self.neurons.iter_mut().find(|n| n.id == id) else {
            return;
        };
        edit(&mut neuron.morphology);
        self.reanchor(id);
    }

    pub fn set_section_included(&mut self, id: NeuronId, section: Section, included: bool) {
        self.update_morphology(id, |morphology| match section {
            Section::Soma => {}
            Section::Apical => morphology.include_apical = included,
            Section::Basal => morphology.include_basal = included,
        });
    }

    fn reanchor(&mut self, id: NeuronId) {
        let Some(morphology) = self.neuron(id).map(|n| n.morphology.clone()) else {
            return;
        };
        for connection in self.connections.iter_mut().filter(|c| c.target_id == id) {
            normalize_anchor(
                &morphology,
                &mut connection.target_section,
                &mut connection.position,
            );
        }
        for stimulator in self.stimulators.iter_mut().filter(|s| s.target_id == id) {
            normalize_anchor(
                &morphology,
                &mut stimulator.target_section,
                &mut stimulator.position,
            );
        }
        for probe in self.probes.iter_mut().filter(|p| p.target_id == id) {
            normalize_anchor(&morphology, &mut probe.section, &mut probe.position);
        }
    }

    pub fn add_connection(
        &mut self,
        source: NeuronId,
        target: NeuronId,
        synapse_type: SynapseType,
        mut section: Section,
        mut position: f32,
    ) -> Option<ConnectionId> {
        self.neuron(source)?;
        let morphology = &self.neuron(target)?.morphology;
        normalize_anchor(morphology, &mut section, &mut position);

        let id = ConnectionId::new();
        self.connections.push(Connection {
            id,
            source_id: source,
            target_id: target,
            synapse_type,
            target_section: section,
            position,
            weight: 0.04,
            delay: 1.0,
        });
        log::debug!("added {} connection {id}", synapse_type.label());
        Some(id)
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        self.connections.len() != before
    }

    /// Field-level edit of a connection. Edits that would point at a missing neuron
    /// are discarded.
    pub fn update_connection(&mut self, id: ConnectionId, edit: impl FnOnce(&mut Connection)) {
        let Some(index) = self.connections.iter().position(|c| c.id == id) else {
            return;
        };
        let mut edited = self.connections[index].clone();
        edit(&mut edited);
        edited.id = id;
        if self.neuron(edited.source_id).is_none() {
            return;
        }
        let Some(target) = self.neuron(edited.target_id) else {
            return;
        };
        normalize_anchor(
            &target.morphology,
            &mut edited.target_section,
            &mut edited.position,
        );
        self.connections[index] = edited;
    }

    /// Move a connection's postsynaptic end.
    pub fn retarget_connection(
        &mut self,
        id: ConnectionId,
        target: NeuronId,
        section: Section,
        position: f32,
    ) {
        self.update_connection(id, |connection| {
            connection.target_id = target;
            connection.target_section = section;
            connection.position = position;
        });
    }

    /// Add a stimulator on the first neuron's soma. Needs at least one neuron.
    pub fn add_stimulator(&mut self) -> Option<StimulatorId> {
        let target_id = self.neurons.first()?.id;
        let id = StimulatorId::new();
        self.stimulators.push(Stimulator {
            id,
            target_id,
            stim_type: StimType::Ampa,
            target_section: Section::Soma,
            position: SOMA_POSITION,
            weight: 0.1,
            delay: 20.0,
        });
        Some(id)
    }

    pub fn remove_stimulator(&mut self, id: StimulatorId) -> bool {
        let before = self.stimulators.len();
        self.stimulators.retain(|s| s.id != id);
        self.stimulators.len() != before
    }

    pub fn update_stimulator(&mut self, id: StimulatorId, edit: impl FnOnce(&mut Stimulator)) {
        let Some(index) = self.stimulators.iter().position(|s| s.id == id) else {
            return;
        };
        let mut edited = self.stimulators[index].clone();
        edit(&mut edited);
        edited.id = id;
        let Some(target) = self.neuron(edited.target_id) else {
            return;
        };
        normalize_anchor(
            &target.morphology,
            &mut edited.target_section,
            &mut edited.position,
        );
        self.stimulators[index] = edited;
    }

    /// Place a recording probe. Its color is picked from the palette by the number of
    /// probes that already exist.
    pub fn add_probe(
        &mut self,
        target: NeuronId,
        mut section: Section,
        mut position: f32,
    ) -> Option<ProbeId> {
        let morphology = &self.neuron(target)?.morphology;
        normalize_anchor(morphology, &mut section, &mut position);

        let id = ProbeId::new();
        let color = distinct_color(self.probes.len());
        self.probes.push(Probe {
            id,
            target_id: target,
            section,
            position,
            color,
        });
        log::debug!("added probe {id} on {section} at {position:.2}");
        Some(id)
    }

    pub fn remove_probe(&mut self, id: ProbeId) -> bool {
        let before = self.probes.len();
        self.probes.retain(|p| p.id != id);
        self.probes.len() != before
    }

    pub fn update_probe(&mut self, id: ProbeId, edit: impl FnOnce(&mut Probe)) {
        let Some(index) = self.probes.iter().position(|p| p.id == id) else {
            return;
        };
        let mut edited = self.probes[index].clone();
        edit(&mut edited);
        edited.id = id;
        let Some(target) = self.neuron(edited.target_id) else {
            return;
        };
        normalize_anchor(&target.morphology, &mut edited.section, &mut edited.position);
        self.probes[index] = edited;
    }

    pub fn set_probe_position(&mut self, id: ProbeId, position: f32) {
        self.update_probe(id, |probe| probe.position = position);
    }

    /// Whether any connection, stimulator or probe still points at `id`.
    pub fn is_referenced(&self, id: NeuronId) -> bool {
        self.connections
            .iter()
            .any(|c| c.source_id == id || c.target_id == id)
            || self.stimulators.iter().any(|s| s.target_id == id)
            || self.probes.iter().any(|p| p.target_id == id)
    }
}
