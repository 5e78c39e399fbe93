//! Where things sit on the schematic surface.
//!
//! Every function here is pure. The renderer and the hit tester both go through
//! these, so what is drawn is exactly what can be picked.

use std::collections::HashMap;

use egui::{pos2, Pos2, Vec2};

use crate::circuit::{Circuit, Morphology, Neuron, NeuronId, Section, SOMA_POSITION};

/// Anatomical micrometres per drawn pixel along a dendrite.
pub const VISUAL_SCALE: f32 = 4.0;

/// Clamp a normalized section position into `[0, 1]`. NaN maps to 0.
pub fn clamp_position(position: f32) -> f32 {
    if position.is_nan() {
        0.0
    } else {
        position.clamp(0.0, 1.0)
    }
}

pub fn visual_length(anatomical_length: f32) -> f32 {
    anatomical_length / VISUAL_SCALE
}

/// Soma centers for every neuron, in surface coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NeuronLayout {
    positions: HashMap<NeuronId, Pos2>,
}

impl NeuronLayout {
    pub fn get(&self, id: NeuronId) -> Option<Pos2> {
        self.positions.get(&id).copied()
    }
}

/// Spread neurons evenly across the width, all on the horizontal midline.
pub fn layout_neurons(neurons: &[Neuron], surface: Vec2) -> NeuronLayout {
    let step = surface.x / (neurons.len() as f32 + 1.0);
    let y = surface.y / 2.0;
    let positions = neurons
        .iter()
        .enumerate()
        .map(|(index, neuron)| (neuron.id, pos2(step * (index as f32 + 1.0), y)))
        .collect();
    NeuronLayout { positions }
}

/// Point at `position` along `section`. Sections the cell does not have resolve to
/// the soma center.
pub fn section_endpoint(
    morphology: &Morphology,
    section: Section,
    position: f32,
    neuron_pos: Pos2,
) -> Pos2 {
    if !morphology.includes(section) {
        return neuron_pos;
    }
    let radius = morphology.soma_radius();
    match section {
        Section::Soma => neuron_pos,
        Section::Apical => pos2(
            neuron_pos.x,
            neuron_pos.y - radius - position * visual_length(morphology.apical_l),
        ),
        Section::Basal => pos2(
            neuron_pos.x,
            neuron_pos.y + radius + position * visual_length(morphology.basal_l),
        ),
    }
}

/// Solve [`section_endpoint`] for the position at pixel row `y`, clamped to `[0, 1]`.
pub fn inverse_section_position(
    section: Section,
    y: f32,
    neuron_pos: Pos2,
    soma_radius: f32,
    anatomical_length: f32,
) -> f32 {
    let length = visual_length(anatomical_length);
    let raw = match section {
        Section::Soma => return SOMA_POSITION,
        _ if length == 0.0 => return 0.0,
        Section::Apical => (neuron_pos.y - soma_radius - y) / length,
        Section::Basal => (y - neuron_pos.y - soma_radius) / length,
    };
    clamp_position(raw)
}

/// Vertical extent of a drawn dendrite. `top` is always the smaller y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionSpan {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
}

impl SectionSpan {
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y <= self.bottom
    }

    /// End attached to the soma.
    pub fn proximal(&self, section: Section) -> Pos2 {
        match section {
            Section::Apical => pos2(self.x, self.bottom),
            _ => pos2(self.x, self.top),
        }
    }

    pub fn distal(&self, section: Section) -> Pos2 {
        match section {
            Section::Apical => pos2(self.x, self.top),
            _ => pos2(self.x, self.bottom),
        }
    }
}

/// The drawn extent of an included dendrite; `None` for the soma and absent dendrites.
pub fn section_span(morphology: &Morphology, section: Section, neuron_pos: Pos2) -> Option<SectionSpan> {
    if section == Section::Soma || !morphology.includes(section) {
        return None;
    }
    let radius = morphology.soma_radius();
    let length = visual_length(morphology.length(section));
    let (top, bottom) = match section {
        Section::Apical => (neuron_pos.y - radius - length, neuron_pos.y - radius),
        _ => (neuron_pos.y + radius, neuron_pos.y + radius + length),
    };
    Some(SectionSpan {
        x: neuron_pos.x,
        top,
        bottom,
    })
}

/// Surface point of an anchor on neuron `target`, if that neuron is laid out.
pub fn anchor_point(
    circuit: &Circuit,
    layout: &NeuronLayout,
    target: NeuronId,
    section: Section,
    position: f32,
) -> Option<Pos2> {
    let neuron = circuit.neuron(target)?;
    let neuron_pos = layout.get(target)?;
    Some(section_endpoint(&neuron.morphology, section, position, neuron_pos))
}
