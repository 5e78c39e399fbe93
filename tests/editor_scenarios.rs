use egui::{pos2, vec2, Pos2, Vec2};
use neuroui::circuit::{Circuit, Section, SynapseType};
use neuroui::geometry::layout_neurons;
use neuroui::interaction::{EditorEvent, Gesture, Interaction};
use neuroui::render::{SchematicScene, SchematicShape};

const SURFACE: Vec2 = vec2(600.0, 400.0);

struct Editor {
    circuit: Circuit,
    interaction: Interaction,
}

impl Editor {
    fn with_neurons(count: usize) -> Self {
        let mut circuit = Circuit::new();
        for _ in 0..count {
            circuit.add_neuron();
        }
        Self {
            circuit,
            interaction: Interaction::new(),
        }
    }

    fn send(&mut self, events: impl IntoIterator<Item = EditorEvent>) {
        for event in events {
            let _ = self.interaction.handle(event, &mut self.circuit, SURFACE);
        }
    }

    /// Press and release in place, the way a browser or egui reports a click.
    fn click(&mut self, at: Pos2) {
        self.send([
            EditorEvent::PointerDown(at),
            EditorEvent::PointerUp,
            EditorEvent::Click(at),
        ]);
    }

    fn soma(&self, index: usize) -> Pos2 {
        let layout = layout_neurons(self.circuit.neurons(), SURFACE);
        layout.get(self.circuit.neurons()[index].id).unwrap()
    }
}

#[test]
fn ampa_draw_creates_one_soma_connection() {
    let mut editor = Editor::with_neurons(2);
    let (n1, n2) = (editor.circuit.neurons()[0].id, editor.circuit.neurons()[1].id);

    editor.send([EditorEvent::ToggleDrawMode(SynapseType::Ampa)]);
    editor.click(editor.soma(0));
    editor.send([EditorEvent::PointerMove(pos2(350.0, 180.0))]);
    editor.click(editor.soma(1));

    let connections = editor.circuit.connections();
    assert_eq!(connections.len(), 1);
    let connection = &connections[0];
    assert_eq!(
        (
            connection.source_id,
            connection.target_id,
            connection.synapse_type,
            connection.target_section,
            connection.position
        ),
        (n1, n2, SynapseType::Ampa, Section::Soma, 0.5)
    );
    assert_eq!((connection.weight, connection.delay), (0.04, 1.0));
    assert_eq!(editor.interaction.gesture(), Gesture::Idle);
}

#[test]
fn draw_onto_a_dendrite_uses_its_position() {
    let mut editor = Editor::with_neurons(2);
    editor.send([EditorEvent::ToggleDrawMode(SynapseType::Gaba)]);
    editor.click(editor.soma(1));
    // 10px soma radius + 25px into the 100px apical shaft.
    editor.click(pos2(200.0, 200.0 - 10.0 - 25.0));

    let connection = &editor.circuit.connections()[0];
    assert_eq!(connection.synapse_type, SynapseType::Gaba);
    assert_eq!(connection.target_section, Section::Apical);
    assert!((connection.position - 0.25).abs() < 1e-6);
}

#[test]
fn escape_mid_draw_creates_nothing() {
    let mut editor = Editor::with_neurons(2);
    editor.send([EditorEvent::ToggleDrawMode(SynapseType::Ampa)]);
    editor.click(editor.soma(0));
    assert!(editor.interaction.gesture().start_point().is_some());

    editor.send([EditorEvent::Cancel]);
    assert_eq!(editor.interaction.gesture(), Gesture::Idle);

    editor.click(editor.soma(1));
    assert!(editor.circuit.connections().is_empty());
    // Outside draw mode the same click places a probe instead.
    assert_eq!(editor.circuit.probes().len(), 1);
}

#[test]
fn clicking_anatomy_adds_probe_and_clicking_probe_removes_it() {
    let mut editor = Editor::with_neurons(1);
    let basal = pos2(300.0, 200.0 + 10.0 + 40.0);
    editor.click(basal);
    editor.click(pos2(300.0, 120.0));
    assert_eq!(editor.circuit.probes().len(), 2);
    let kept = editor.circuit.probes()[1].id;

    editor.click(basal);
    assert_eq!(editor.circuit.probes().len(), 1);
    assert_eq!(editor.circuit.probes()[0].id, kept);
}

#[test]
fn endpoint_beats_overlapping_probe() {
    let mut editor = Editor::with_neurons(2);
    let (n1, n2) = (editor.circuit.neurons()[0].id, editor.circuit.neurons()[1].id);
    let probe = editor.circuit.add_probe(n2, Section::Soma, 0.5).unwrap();
    let connection = editor
        .circuit
        .add_connection(n1, n2, SynapseType::Ampa, Section::Soma, 0.5)
        .unwrap();

    editor.send([EditorEvent::PointerDown(editor.soma(1))]);
    assert_eq!(
        editor.interaction.gesture(),
        Gesture::DraggingConnectionEndpoint(connection)
    );

    editor.send([EditorEvent::PointerUp]);
    assert_eq!(editor.interaction.gesture(), Gesture::Idle);
    assert!(editor.circuit.probe(probe).is_some());
}

#[test]
fn neuron_removal_leaves_no_references() {
    let mut editor = Editor::with_neurons(3);
    let ids: Vec<_> = editor.circuit.neurons().iter().map(|n| n.id).collect();
    let doomed = ids[0];
    let circuit = &mut editor.circuit;
    circuit
        .add_connection(doomed, ids[1], SynapseType::Ampa, Section::Soma, 0.5)
        .unwrap();
    circuit
        .add_connection(ids[2], doomed, SynapseType::Gaba, Section::Basal, 0.5)
        .unwrap();
    circuit
        .add_connection(ids[1], ids[2], SynapseType::Ampa, Section::Soma, 0.5)
        .unwrap();
    circuit.add_stimulator().unwrap();
    circuit.add_probe(doomed, Section::Apical, 0.3).unwrap();

    circuit.remove_neuron(doomed);

    assert!(!circuit.is_referenced(doomed));
    assert_eq!(circuit.connections().len(), 1);
    assert!(circuit.stimulators().is_empty());
    assert!(circuit.probes().is_empty());
}

#[test]
fn disabling_apical_reanchors_probe_and_redraws_on_soma() {
    let mut editor = Editor::with_neurons(1);
    let id = editor.circuit.neurons()[0].id;
    let probe = editor.circuit.add_probe(id, Section::Apical, 0.7).unwrap();

    editor.circuit.set_section_included(id, Section::Apical, false);

    let anchored = editor.circuit.probe(probe).unwrap();
    assert_eq!((anchored.section, anchored.position), (Section::Soma, 0.5));

    let scene = SchematicScene::build(&editor.circuit, &editor.interaction, SURFACE);
    let markers: Vec<_> = scene
        .shapes()
        .iter()
        .filter_map(|shape| match shape {
            SchematicShape::ProbeMarker { center, .. } => Some(*center),
            _ => None,
        })
        .collect();
    assert_eq!(markers, [pos2(300.0, 200.0)]);
    let shafts = scene
        .shapes()
        .iter()
        .filter(|shape| matches!(shape, SchematicShape::Shaft { .. }))
        .count();
    assert_eq!(shafts, 1);
}

#[test]
fn drag_then_click_keeps_the_probe() {
    let mut editor = Editor::with_neurons(1);
    let id = editor.circuit.neurons()[0].id;
    let probe = editor.circuit.add_probe(id, Section::Basal, 0.0).unwrap();

    editor.send([
        EditorEvent::PointerDown(pos2(300.0, 210.0)),
        EditorEvent::PointerMove(pos2(300.0, 235.0)),
        EditorEvent::PointerUp,
        EditorEvent::Click(pos2(300.0, 235.0)),
    ]);

    let moved = editor.circuit.probe(probe).unwrap();
    assert!((moved.position - 0.5).abs() < 1e-6);
    assert!(!editor.interaction.was_dragged());

    // The next plain click on it removes it.
    editor.click(pos2(300.0, 235.0));
    assert!(editor.circuit.probe(probe).is_none());
}
