//! Probabilistic mode: neuron populations wired together by connection rules.

use serde::{Deserialize, Serialize};

use crate::circuit::{entity_id, Morphology, Section, StimType, SynapseType, SOMA_POSITION};
use crate::geometry::clamp_position;
use crate::themes::{distinct_color, HexColor};

entity_id!(PopulationId);
entity_id!(ConnectionStrategyId);
entity_id!(StimulationStrategyId);
entity_id!(ProbabilisticProbeId);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub id: PopulationId,
    pub name: String,
    pub quantity: u32,
    pub morphology: Morphology,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStrategy {
    pub id: ConnectionStrategyId,
    pub source_pop_id: PopulationId,
    pub target_pop_id: PopulationId,
    pub synapse_type: SynapseType,
    pub probability: f32,
    pub weight: f32,
    pub delay: f32,
    pub target_section: Section,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StimulationStrategy {
    pub id: StimulationStrategyId,
    pub target_pop_id: PopulationId,
    pub stim_type: StimType,
    pub target_section: Section,
    pub percentage: f32,
    pub weight: f32,
    pub delay: f32,
    pub is_noisy: bool,
}

/// Records from `count` randomly chosen members of a population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilisticProbe {
    pub id: ProbabilisticProbeId,
    pub target_pop_id: PopulationId,
    pub count: u32,
    pub section: Section,
    pub position: f32,
    pub color: HexColor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopulationModel {
    populations: Vec<Population>,
    connection_strategies: Vec<ConnectionStrategy>,
    stimulation_strategies: Vec<StimulationStrategy>,
    probes: Vec<ProbabilisticProbe>,
    selected: Option<PopulationId>,
}

impl Default for PopulationModel {
    fn default() -> Self {
        let mut model = Self::empty();
        model.push_population("Excitatory Pop", 80);
        model.push_population("Inhibitory Pop", 20);
        if let Some(first) = model.populations.first() {
            model.selected = Some(first.id);
        }
        model
    }
}

impl PopulationModel {
    pub fn empty() -> Self {
        Self {
            populations: Vec::new(),
            connection_strategies: Vec::new(),
            stimulation_strategies: Vec::new(),
            probes: Vec::new(),
            selected: None,
        }
    }

    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    pub fn connection_strategies(&self) -> &[ConnectionStrategy] {
        &self.connection_strategies
    }

    pub fn stimulation_strategies(&self) -> &[StimulationStrategy] {
        &self.stimulation_strategies
    }

    pub fn probes(&self) -> &[ProbabilisticProbe] {
        &self.probes
    }

    pub fn population(&self, id: PopulationId) -> Option<&Population> {
        self.populations.iter().find(|p| p.id == id)
    }

    pub fn selected(&self) -> Option<PopulationId> {
        self.selected
    }

    pub fn selected_population(&self) -> Option<&Population> {
        self.selected.and_then(|id| self.population(id))
    }

    pub fn select(&mut self, id: PopulationId) {
        if self.population(id).is_some() {
            self.selected = Some(id);
        }
    }

    fn push_population(&mut self, name: &str, quantity: u32) -> PopulationId {
        let id = PopulationId::new();
        self.populations.push(Population {
            id,
            name: name.to_owned(),
            quantity,
            morphology: Morphology::default(),
        });
        id
    }

    pub fn add_population(&mut self) -> PopulationId {
        let name = format!("Population {}", self.populations.len() + 1);
        let id = self.push_population(&name, 100);
        self.selected = Some(id);
        id
    }

    pub fn update_population(&mut self, id: PopulationId, edit: impl FnOnce(&mut Population)) {
        if let Some(population) = self.populations.iter_mut().find(|p| p.id == id) {
            edit(population);
            population.id = id;
        }
    }

    /// Remove a population and every rule or probe that mentions it.
    pub fn remove_population(&mut self, id: PopulationId) -> bool {
        let before = self.populations.len();
        self.populations.retain(|p| p.id != id);
        if self.populations.len() == before {
            return false;
        }
        self.connection_strategies
            .retain(|s| s.source_pop_id != id && s.target_pop_id != id);
        self.stimulation_strategies.retain(|s| s.target_pop_id != id);
        self.probes.retain(|p| p.target_pop_id != id);
        if self.selected == Some(id) {
            self.selected = self.populations.first().map(|p| p.id);
        }
        log::debug!("removed population {id} and its rules");
        true
    }

    pub fn add_connection_strategy(&mut self) -> Option<ConnectionStrategyId> {
        let first = self.populations.first()?.id;
        let id = ConnectionStrategyId::new();
        self.connection_strategies.push(ConnectionStrategy {
            id,
            source_pop_id: first,
            target_pop_id: first,
            synapse_type: SynapseType::Ampa,
            probability: 0.1,
            weight: 0.04,
            delay: 1.0,
            target_section: Section::Apical,
        });
        Some(id)
    }

    pub fn update_connection_strategy(
        &mut self,
        id: ConnectionStrategyId,
        edit: impl FnOnce(&mut ConnectionStrategy),
    ) {
        let Some(index) = self.connection_strategies.iter().position(|s| s.id == id) else {
            return;
        };
        let mut edited = self.connection_strategies[index].clone();
        edit(&mut edited);
        edited.id = id;
        if self.population(edited.source_pop_id).is_some()
            && self.population(edited.target_pop_id).is_some()
        {
            self.connection_strategies[index] = edited;
        }
    }

    pub fn remove_connection_strategy(&mut self, id: ConnectionStrategyId) -> bool {
        let before = self.connection_strategies.len();
        self.connection_strategies.retain(|s| s.id != id);
        self.connection_strategies.len() != before
    }

    pub fn add_stimulation_strategy(&mut self) -> Option<StimulationStrategyId> {
        let first = self.populations.first()?.id;
        let id = StimulationStrategyId::new();
        self.stimulation_strategies.push(StimulationStrategy {
            id,
            target_pop_id: first,
            stim_type: StimType::Ampa,
            target_section: Section::Soma,
            percentage: 10.0,
            weight: 0.1,
            delay: 20.0,
            is_noisy: false,
        });
        Some(id)
    }

    pub fn update_stimulation_strategy(
        &mut self,
        id: StimulationStrategyId,
        edit: impl FnOnce(&mut StimulationStrategy),
    ) {
        let Some(index) = self.stimulation_strategies.iter().position(|s| s.id == id) else {
            return;
        };
        let mut edited = self.stimulation_strategies[index].clone();
        edit(&mut edited);
        edited.id = id;
        if self.population(edited.target_pop_id).is_some() {
            self.stimulation_strategies[index] = edited;
        }
    }

    pub fn remove_stimulation_strategy(&mut self, id: StimulationStrategyId) -> bool {
        let before = self.stimulation_strategies.len();
        self.stimulation_strategies.retain(|s| s.id != id);
        self.stimulation_strategies.len() != before
    }

    pub fn add_probe(&mut self) -> Option<ProbabilisticProbeId> {
        let first = self.populations.first()?.id;
        let id = ProbabilisticProbeId::new();
        let color = distinct_color(self.probes.len());
        self.probes.push(ProbabilisticProbe {
            id,
            target_pop_id: first,
            count: 1,
            section: Section::Soma,
            position: SOMA_POSITION,
            color,
        });
        Some(id)
    }

    pub fn update_probe(
        &mut self,
        id: ProbabilisticProbeId,
        edit: impl FnOnce(&mut ProbabilisticProbe),
    ) {
        let Some(index) = self.probes.iter().position(|p| p.id == id) else {
            return;
        };
        let mut edited = self.probes[index].clone();
        edit(&mut edited);
        edited.id = id;
        if self.population(edited.target_pop_id).is_none() {
            return;
        }
        edited.position = match edited.section {
            Section::Soma => SOMA_POSITION,
            _ => clamp_position(edited.position),
        };
        self.probes[index] = edited;
    }

    pub fn remove_probe(&mut self, id: ProbabilisticProbeId) -> bool {
        let before = self.probes.len();
        self.probes.retain(|p| p.id != id);
        self.probes.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_two_populations() {
        let model = PopulationModel::default();
        let names: Vec<_> = model
            .populations()
            .iter()
            .map(|p| (p.name.as_str(), p.quantity))
            .collect();
        assert_eq!(names, [("Excitatory Pop", 80), ("Inhibitory Pop", 20)]);
        assert_eq!(model.selected(), Some(model.populations()[0].id));
    }

    #[test]
    fn rules_default_to_first_population() {
        let mut model = PopulationModel::default();
        let first = model.populations()[0].id;
        model.add_connection_strategy().unwrap();
        model.add_stimulation_strategy().unwrap();
        model.add_probe().unwrap();

        let rule = &model.connection_strategies()[0];
        assert_eq!((rule.source_pop_id, rule.target_pop_id), (first, first));
        assert_eq!(rule.target_section, Section::Apical);
        assert_eq!(rule.probability, 0.1);
        let stim = &model.stimulation_strategies()[0];
        assert_eq!(stim.percentage, 10.0);
        assert!(!stim.is_noisy);
        assert_eq!(model.probes()[0].color, distinct_color(0));
    }

    #[test]
    fn rules_need_a_population() {
        let mut model = PopulationModel::empty();
        assert!(model.add_connection_strategy().is_none());
        assert!(model.add_stimulation_strategy().is_none());
        assert!(model.add_probe().is_none());
    }

    #[test]
    fn removing_population_cascades() {
        let mut model = PopulationModel::default();
        let exc = model.populations()[0].id;
        let inh = model.populations()[1].id;
        let rule = model.add_connection_strategy().unwrap();
        model.update_connection_strategy(rule, |r| r.target_pop_id = inh);
        model.add_stimulation_strategy().unwrap();
        model.add_probe().unwrap();

        assert!(model.remove_population(inh));
        assert!(model.connection_strategies().is_empty());
        assert_eq!(model.stimulation_strategies().len(), 1);

        assert!(model.remove_population(exc));
        assert!(model.stimulation_strategies().is_empty());
        assert!(model.probes().is_empty());
        assert_eq!(model.selected(), None);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut model = PopulationModel::default();
        model.add_stimulation_strategy().unwrap();
        let json = serde_json::to_value(&model.stimulation_strategies()[0]).unwrap();
        assert_eq!(json["isNoisy"], false);
        assert_eq!(json["targetSection"], "Soma");
        assert_eq!(json["stimType"], "AMPA");
    }
}
