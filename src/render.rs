//! Draw list for the circuit schematic.
//!
//! A [`SchematicScene`] is rebuilt from scratch every frame. Building is pure and
//! works in surface coordinates; [`SchematicScene::paint`] offsets everything by the
//! widget origin and hands it to an egui painter.

use std::f32::consts::FRAC_PI_6;

use egui::{pos2, vec2, Align2, FontId, Painter, Pos2, Shape, Stroke, Vec2};

use crate::circuit::{Circuit, Section, SynapseType};
use crate::geometry::{anchor_point, layout_neurons, section_span};
use crate::interaction::Interaction;
use crate::themes::{HexColor, SchematicStyle};

pub const ARROWHEAD_LENGTH: f32 = 15.0;
pub const PROBE_MARKER_RADIUS: f32 = 5.0;
/// Distance from the bottom of the soma to the name label.
pub const LABEL_OFFSET: f32 = 20.0;
pub const PREVIEW_DASH: f32 = 5.0;
pub const PREVIEW_GAP: f32 = 5.0;
pub const PREVIEW_WIDTH: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub enum SchematicShape {
    Edge {
        from: Pos2,
        to: Pos2,
        synapse: SynapseType,
    },
    Arrowhead {
        tip: Pos2,
        left: Pos2,
        right: Pos2,
        synapse: SynapseType,
    },
    Shaft {
        from: Pos2,
        to: Pos2,
    },
    Soma {
        center: Pos2,
        radius: f32,
        selected: bool,
    },
    Label {
        anchor: Pos2,
        text: String,
    },
    ProbeMarker {
        center: Pos2,
        color: HexColor,
    },
    Preview {
        from: Pos2,
        to: Pos2,
        synapse: SynapseType,
    },
}

#[derive(Clone, Debug, Default)]
pub struct SchematicScene {
    shapes: Vec<SchematicShape>,
}

fn arrowhead(from: Pos2, tip: Pos2, synapse: SynapseType) -> SchematicShape {
    let angle = (tip.y - from.y).atan2(tip.x - from.x);
    let barb = |offset: f32| {
        let a = angle + offset;
        tip - vec2(a.cos(), a.sin()) * ARROWHEAD_LENGTH
    };
    SchematicShape::Arrowhead {
        tip,
        left: barb(-FRAC_PI_6),
        right: barb(FRAC_PI_6),
        synapse,
    }
}

impl SchematicScene {
    pub fn build(circuit: &Circuit, interaction: &Interaction, surface: Vec2) -> Self {
        let _span = tracing::info_span!("schematic_scene_build").entered();
        let layout = layout_neurons(circuit.neurons(), surface);
        let mut shapes = Vec::new();

        for connection in circuit.connections() {
            let Some(from) = layout.get(connection.source_id) else {
                continue;
            };
            let Some(tip) = anchor_point(
                circuit,
                &layout,
                connection.target_id,
                connection.target_section,
                connection.position,
            ) else {
                continue;
            };
            shapes.push(SchematicShape::Edge {
                from,
                to: tip,
                synapse: connection.synapse_type,
            });
            shapes.push(arrowhead(from, tip, connection.synapse_type));
        }

        for neuron in circuit.neurons() {
            let Some(center) = layout.get(neuron.id) else {
                continue;
            };
            let morphology = &neuron.morphology;
            for section in [Section::Apical, Section::Basal] {
                if let Some(span) = section_span(morphology, section, center) {
                    shapes.push(SchematicShape::Shaft {
                        from: span.proximal(section),
                        to: span.distal(section),
                    });
                }
            }
            let radius = morphology.soma_radius();
            shapes.push(SchematicShape::Soma {
                center,
                radius,
                selected: circuit.selected() == Some(neuron.id),
            });
            shapes.push(SchematicShape::Label {
                anchor: pos2(center.x, center.y + radius + LABEL_OFFSET),
                text: neuron.name.clone(),
            });
        }

        for probe in circuit.probes() {
            if let Some(center) =
                anchor_point(circuit, &layout, probe.target_id, probe.section, probe.position)
            {
                shapes.push(SchematicShape::ProbeMarker {
                    center,
                    color: probe.color,
                });
            }
        }

        if let Some(preview) = interaction.preview(&layout) {
            shapes.push(SchematicShape::Preview {
                from: preview.from,
                to: preview.to,
                synapse: preview.synapse,
            });
        }

        Self { shapes }
    }

    pub fn shapes(&self) -> &[SchematicShape] {
        &self.shapes
    }

    /// Paint back to front, translating surface coordinates by `origin`.
    pub fn paint(&self, painter: &Painter, origin: Pos2, style: &SchematicStyle) {
        let _span = tracing::info_span!("schematic_scene_paint", shapes = self.shapes.len()).entered();
        let at = |p: Pos2| origin + p.to_vec2();
        let font_id = FontId::proportional(12.0);

        for shape in &self.shapes {
            match shape {
                SchematicShape::Edge { from, to, synapse } => {
                    painter.line_segment(
                        [at(*from), at(*to)],
                        Stroke::new(style.edge_width, style.synapse_color(*synapse)),
                    );
                }
                SchematicShape::Arrowhead {
                    tip,
                    left,
                    right,
                    synapse,
                } => {
                    painter.add(Shape::convex_polygon(
                        vec![at(*tip), at(*left), at(*right)],
                        style.synapse_color(*synapse),
                        Stroke::NONE,
                    ));
                }
                SchematicShape::Shaft { from, to } => {
                    painter.line_segment(
                        [at(*from), at(*to)],
                        Stroke::new(style.shaft_width, style.ink),
                    );
                }
                SchematicShape::Soma {
                    center,
                    radius,
                    selected,
                } => {
                    let fill = if *selected {
                        style.soma_selected_fill
                    } else {
                        style.soma_fill
                    };
                    painter.circle(
                        at(*center),
                        *radius,
                        fill,
                        Stroke::new(style.shaft_width, style.ink),
                    );
                }
                SchematicShape::Label { anchor, text } => {
                    painter.text(
                        at(*anchor),
                        Align2::CENTER_BOTTOM,
                        text,
                        font_id.clone(),
                        style.ink,
                    );
                }
                SchematicShape::ProbeMarker { center, color } => {
                    painter.circle_filled(at(*center), PROBE_MARKER_RADIUS, color.color());
                }
                SchematicShape::Preview { from, to, synapse } => {
                    painter.extend(Shape::dashed_line(
                        &[at(*from), at(*to)],
                        Stroke::new(PREVIEW_WIDTH, style.synapse_color(*synapse)),
                        PREVIEW_DASH,
                        PREVIEW_GAP,
                    ));
                }
            }
        }
    }
}
