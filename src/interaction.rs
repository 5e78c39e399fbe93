//! The schematic's gesture state machine.
//!
//! Pointer and keyboard input arrives as [`EditorEvent`]s in surface coordinates.
//! [`Interaction::handle`] hit-tests against the current layout and decides whether
//! to change the gesture, the circuit, or nothing.

use egui::{Context, Key, Pos2, Vec2};

use crate::circuit::{Circuit, ConnectionId, NeuronId, ProbeId, Section, SynapseType};
use crate::geometry::{inverse_section_position, layout_neurons, NeuronLayout};
use crate::hit_test::HitTester;

/// First end of a connection being drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StartPoint {
    pub neuron: NeuronId,
    /// Soma center of `neuron` when the point was captured.
    pub origin: Pos2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    DraggingProbe(ProbeId),
    DraggingConnectionEndpoint(ConnectionId),
    DrawingConnection {
        synapse: SynapseType,
        start: Option<StartPoint>,
    },
}

impl Gesture {
    pub fn drawing(&self) -> Option<SynapseType> {
        match self {
            Gesture::DrawingConnection { synapse, .. } => Some(*synapse),
            _ => None,
        }
    }

    pub fn start_point(&self) -> Option<StartPoint> {
        match self {
            Gesture::DrawingConnection { start, .. } => *start,
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EditorEvent {
    PointerDown(Pos2),
    PointerMove(Pos2),
    PointerUp,
    Click(Pos2),
    ToggleDrawMode(SynapseType),
    Cancel,
}

#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Ignored,
    GestureChanged,
    CircuitChanged,
}

/// Dashed line from the captured start point to the cursor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewLine {
    pub from: Pos2,
    pub to: Pos2,
    pub synapse: SynapseType,
}

#[derive(Clone, Debug, Default)]
pub struct Interaction {
    gesture: Gesture,
    was_dragged: bool,
    pointer: Option<Pos2>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn was_dragged(&self) -> bool {
        self.was_dragged
    }

    pub fn handle(&mut self, event: EditorEvent, circuit: &mut Circuit, surface: Vec2) -> EditOutcome {
        match event {
            EditorEvent::PointerDown(point) => self.pointer_down(point, circuit, surface),
            EditorEvent::PointerMove(point) => self.pointer_move(point, circuit, surface),
            EditorEvent::PointerUp => self.pointer_up(),
            EditorEvent::Click(point) => self.click(point, circuit, surface),
            EditorEvent::ToggleDrawMode(synapse) => self.toggle_draw_mode(synapse),
            EditorEvent::Cancel => self.cancel(),
        }
    }

    fn set_gesture(&mut self, gesture: Gesture) -> EditOutcome {
        if self.gesture == gesture {
            return EditOutcome::Ignored;
        }
        log::debug!("gesture {:?} -> {:?}", self.gesture, gesture);
        self.gesture = gesture;
        EditOutcome::GestureChanged
    }

    fn pointer_down(&mut self, point: Pos2, circuit: &Circuit, surface: Vec2) -> EditOutcome {
        self.was_dragged = false;
        if matches!(self.gesture, Gesture::DrawingConnection { .. }) {
            return EditOutcome::Ignored;
        }
        let tester = HitTester::new(circuit, surface);
        if let Some(connection) = tester.connection(point) {
            return self.set_gesture(Gesture::DraggingConnectionEndpoint(connection.id));
        }
        if let Some(probe) = tester.probe(point) {
            return self.set_gesture(Gesture::DraggingProbe(probe.id));
        }
        EditOutcome::Ignored
    }

    fn pointer_move(&mut self, point: Pos2, circuit: &mut Circuit, surface: Vec2) -> EditOutcome {
        self.pointer = Some(point);
        match self.gesture {
            Gesture::DraggingConnectionEndpoint(id) => {
                self.was_dragged = true;
                let hit = HitTester::new(circuit, surface)
                    .anatomy(point)
                    .map(|hit| (hit.neuron.id, hit.section, hit.position));
                let Some((target, section, position)) = hit else {
                    return EditOutcome::Ignored;
                };
                circuit.retarget_connection(id, target, section, position);
                EditOutcome::CircuitChanged
            }
            Gesture::DraggingProbe(id) => {
                self.was_dragged = true;
                let layout = layout_neurons(circuit.neurons(), surface);
                let Some(position) = probe_drag_position(circuit, &layout, id, point.y) else {
                    return EditOutcome::Ignored;
                };
                circuit.set_probe_position(id, position);
                EditOutcome::CircuitChanged
            }
            Gesture::Idle | Gesture::DrawingConnection { .. } => EditOutcome::Ignored,
        }
    }

    fn pointer_up(&mut self) -> EditOutcome {
        match self.gesture {
            Gesture::DraggingProbe(_) | Gesture::DraggingConnectionEndpoint(_) => {
                self.set_gesture(Gesture::Idle)
            }
            _ => EditOutcome::Ignored,
        }
    }

    fn click(&mut self, point: Pos2, circuit: &mut Circuit, surface: Vec2) -> EditOutcome {
        if self.was_dragged {
            self.was_dragged = false;
            return EditOutcome::Ignored;
        }

        let tester = HitTester::new(circuit, surface);
        if let Gesture::DrawingConnection { synapse, start } = self.gesture {
            let Some(hit) = tester.anatomy(point) else {
                return EditOutcome::Ignored;
            };
            let (target, section, position) = (hit.neuron.id, hit.section, hit.position);
            return match start {
                None => {
                    let start = StartPoint {
                        neuron: target,
                        origin: hit.neuron_pos,
                    };
                    log::debug!("connection start captured on {target}");
                    self.set_gesture(Gesture::DrawingConnection {
                        synapse,
                        start: Some(start),
                    })
                }
                Some(start) => {
                    if let Some(id) =
                        circuit.add_connection(start.neuron, target, synapse, section, position)
                    {
                        log::info!("drew {} connection {id}", synapse.label());
                    }
                    self.gesture = Gesture::Idle;
                    EditOutcome::CircuitChanged
                }
            };
        }

        if let Some(probe) = tester.probe(point) {
            let id = probe.id;
            circuit.remove_probe(id);
            log::debug!("removed probe {id}");
            return EditOutcome::CircuitChanged;
        }
        let hit = tester
            .anatomy(point)
            .map(|hit| (hit.neuron.id, hit.section, hit.position));
        match hit {
            Some((target, section, position)) => {
                circuit.add_probe(target, section, position);
                EditOutcome::CircuitChanged
            }
            None => EditOutcome::Ignored,
        }
    }

    fn toggle_draw_mode(&mut self, synapse: SynapseType) -> EditOutcome {
        let next = match self.gesture {
            Gesture::DrawingConnection { synapse: active, .. } if active == synapse => Gesture::Idle,
            Gesture::DrawingConnection { start, .. } => Gesture::DrawingConnection { synapse, start },
            _ => Gesture::DrawingConnection {
                synapse,
                start: None,
            },
        };
        self.set_gesture(next)
    }

    fn cancel(&mut self) -> EditOutcome {
        match self.gesture {
            Gesture::DrawingConnection { .. } => self.set_gesture(Gesture::Idle),
            _ => EditOutcome::Ignored,
        }
    }

    /// Drop references to entities that were removed outside the schematic.
    pub fn forget_missing(&mut self, circuit: &Circuit) {
        match self.gesture {
            Gesture::DraggingProbe(id) if circuit.probe(id).is_none() => {
                self.gesture = Gesture::Idle;
            }
            Gesture::DraggingConnectionEndpoint(id) if circuit.connection(id).is_none() => {
                self.gesture = Gesture::Idle;
            }
            Gesture::DrawingConnection {
                synapse,
                start: Some(start),
            } if circuit.neuron(start.neuron).is_none() => {
                self.gesture = Gesture::DrawingConnection {
                    synapse,
                    start: None,
                };
            }
            _ => {}
        }
    }

    /// The in-progress connection, anchored on the start neuron's current layout.
    pub fn preview(&self, layout: &NeuronLayout) -> Option<PreviewLine> {
        let Gesture::DrawingConnection {
            synapse,
            start: Some(start),
        } = self.gesture
        else {
            return None;
        };
        let to = self.pointer?;
        let from = layout.get(start.neuron).unwrap_or(start.origin);
        Some(PreviewLine { from, to, synapse })
    }
}

/// Where a dragged probe lands when the cursor is at row `y`. Soma probes stay put.
fn probe_drag_position(circuit: &Circuit, layout: &NeuronLayout, id: ProbeId, y: f32) -> Option<f32> {
    let probe = circuit.probe(id)?;
    if probe.section == Section::Soma {
        return None;
    }
    let neuron = circuit.neuron(probe.target_id)?;
    let neuron_pos = layout.get(neuron.id)?;
    let morphology = &neuron.morphology;
    Some(inverse_section_position(
        probe.section,
        y,
        neuron_pos,
        morphology.soma_radius(),
        morphology.length(probe.section),
    ))
}

/// Global Escape listener feeding [`EditorEvent::Cancel`], whatever has focus.
#[derive(Clone, Copy, Debug)]
pub struct CancelKey {
    key: Key,
}

impl Default for CancelKey {
    fn default() -> Self {
        Self { key: Key::Escape }
    }
}

impl CancelKey {
    pub fn poll(&self, ctx: &Context) -> Option<EditorEvent> {
        ctx.input(|input| input.key_pressed(self.key))
            .then_some(EditorEvent::Cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    const SURFACE: Vec2 = vec2(600.0, 400.0);

    fn send(interaction: &mut Interaction, circuit: &mut Circuit, events: &[EditorEvent]) {
        for event in events {
            let _ = interaction.handle(*event, circuit, SURFACE);
        }
    }

    #[test]
    fn toggling_same_type_leaves_draw_mode() {
        let mut circuit = Circuit::with_principal_cell();
        let mut interaction = Interaction::new();
        send(
            &mut interaction,
            &mut circuit,
            &[
                EditorEvent::ToggleDrawMode(SynapseType::Ampa),
                EditorEvent::Click(pos2(300.0, 200.0)),
            ],
        );
        assert!(interaction.gesture().start_point().is_some());

        send(
            &mut interaction,
            &mut circuit,
            &[EditorEvent::ToggleDrawMode(SynapseType::Gaba)],
        );
        assert_eq!(interaction.gesture().drawing(), Some(SynapseType::Gaba));
        assert!(interaction.gesture().start_point().is_some());

        send(
            &mut interaction,
            &mut circuit,
            &[EditorEvent::ToggleDrawMode(SynapseType::Gaba)],
        );
        assert_eq!(interaction.gesture(), Gesture::Idle);
    }

    #[test]
    fn presses_while_drawing_are_ignored() {
        let mut circuit = Circuit::with_principal_cell();
        let id = circuit.neurons()[0].id;
        circuit.add_probe(id, Section::Soma, 0.5).unwrap();
        let mut interaction = Interaction::new();
        send(
            &mut interaction,
            &mut circuit,
            &[
                EditorEvent::ToggleDrawMode(SynapseType::Ampa),
                EditorEvent::PointerDown(pos2(300.0, 200.0)),
            ],
        );
        assert_eq!(interaction.gesture().drawing(), Some(SynapseType::Ampa));
    }

    #[test]
    fn probe_drag_slides_along_section() {
        let mut circuit = Circuit::with_principal_cell();
        let id = circuit.neurons()[0].id;
        let probe = circuit.add_probe(id, Section::Apical, 0.5).unwrap();
        let mut interaction = Interaction::new();

        send(
            &mut interaction,
            &mut circuit,
            &[
                EditorEvent::PointerDown(pos2(300.0, 140.0)),
                EditorEvent::PointerMove(pos2(340.0, 100.0)),
            ],
        );
        assert_eq!(interaction.gesture(), Gesture::DraggingProbe(probe));
        assert!((circuit.probe(probe).unwrap().position - 0.9).abs() < 1e-5);

        send(
            &mut interaction,
            &mut circuit,
            &[EditorEvent::PointerMove(pos2(300.0, -300.0))],
        );
        assert_eq!(circuit.probe(probe).unwrap().position, 1.0);

        send(
            &mut interaction,
            &mut circuit,
            &[EditorEvent::PointerUp, EditorEvent::Click(pos2(300.0, 90.0))],
        );
        assert_eq!(interaction.gesture(), Gesture::Idle);
        assert!(circuit.probe(probe).is_some(), "click after drag must not remove");
        assert!(!interaction.was_dragged());
    }

    #[test]
    fn soma_probe_drag_is_a_no_op() {
        let mut circuit = Circuit::with_principal_cell();
        let id = circuit.neurons()[0].id;
        let probe = circuit.add_probe(id, Section::Soma, 0.5).unwrap();
        let mut interaction = Interaction::new();
        send(
            &mut interaction,
            &mut circuit,
            &[
                EditorEvent::PointerDown(pos2(300.0, 200.0)),
                EditorEvent::PointerMove(pos2(300.0, 120.0)),
            ],
        );
        let probe = circuit.probe(probe).unwrap();
        assert_eq!((probe.section, probe.position), (Section::Soma, 0.5));
        assert!(interaction.was_dragged());
    }

    #[test]
    fn dragging_endpoint_retargets_connection() {
        let mut circuit = Circuit::new();
        let a = circuit.add_neuron();
        let b = circuit.add_neuron();
        let conn = circuit
            .add_connection(a, b, SynapseType::Gaba, Section::Soma, 0.5)
            .unwrap();
        let mut interaction = Interaction::new();
        send(
            &mut interaction,
            &mut circuit,
            &[
                EditorEvent::PointerDown(pos2(400.0, 200.0)),
                EditorEvent::PointerMove(pos2(200.0, 260.0)),
                EditorEvent::PointerMove(pos2(20.0, 20.0)),
                EditorEvent::PointerUp,
            ],
        );
        let conn = circuit.connection(conn).unwrap();
        assert_eq!(conn.target_id, a);
        assert_eq!(conn.target_section, Section::Basal);
        assert_eq!(conn.position, 1.0);
        assert_eq!(interaction.gesture(), Gesture::Idle);
    }

    #[test]
    fn pointer_up_keeps_drawing() {
        let mut circuit = Circuit::with_principal_cell();
        let mut interaction = Interaction::new();
        send(
            &mut interaction,
            &mut circuit,
            &[
                EditorEvent::ToggleDrawMode(SynapseType::Ampa),
                EditorEvent::PointerUp,
                EditorEvent::Cancel,
                EditorEvent::Cancel,
            ],
        );
        assert_eq!(interaction.gesture(), Gesture::Idle);
    }

    #[test]
    fn preview_follows_pointer_and_layout() {
        let mut circuit = Circuit::with_principal_cell();
        let mut interaction = Interaction::new();
        send(
            &mut interaction,
            &mut circuit,
            &[
                EditorEvent::ToggleDrawMode(SynapseType::Gaba),
                EditorEvent::Click(pos2(300.0, 200.0)),
                EditorEvent::PointerMove(pos2(10.0, 20.0)),
            ],
        );
        let wide = layout_neurons(circuit.neurons(), vec2(1000.0, 400.0));
        let preview = interaction.preview(&wide).unwrap();
        assert_eq!(preview.from, pos2(500.0, 200.0));
        assert_eq!(preview.to, pos2(10.0, 20.0));
        assert_eq!(preview.synapse, SynapseType::Gaba);
    }

    #[test]
    fn removed_start_neuron_is_forgotten() {
        let mut circuit = Circuit::with_principal_cell();
        let id = circuit.neurons()[0].id;
        let mut interaction = Interaction::new();
        send(
            &mut interaction,
            &mut circuit,
            &[
                EditorEvent::ToggleDrawMode(SynapseType::Ampa),
                EditorEvent::Click(pos2(300.0, 200.0)),
            ],
        );
        circuit.remove_neuron(id);
        interaction.forget_missing(&circuit);
        assert_eq!(
            interaction.gesture(),
            Gesture::DrawingConnection {
                synapse: SynapseType::Ampa,
                start: None
            }
        );
    }

    #[test]
    fn escape_cancels_even_when_a_text_field_has_focus() {
        let ctx = Context::default();
        let cancel = CancelKey::default();
        let mut text = String::new();
        let mut run = |events: Vec<egui::Event>| {
            let input = egui::RawInput {
                events,
                ..Default::default()
            };
            let mut polled = None;
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    let field = ui.text_edit_singleline(&mut text);
                    if !field.has_focus() {
                        field.request_focus();
                    }
                });
                polled = polled.or(cancel.poll(ctx));
            });
            polled
        };

        assert_eq!(run(Vec::new()), None);
        assert_eq!(run(Vec::new()), None);
        let escape = egui::Event::Key {
            key: Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: Default::default(),
        };
        assert_eq!(run(vec![escape]), Some(EditorEvent::Cancel));
    }
}
