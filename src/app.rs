use eframe::egui::{
    self, vec2, Color32, ComboBox, DragValue, Key, Modifiers, RichText, ScrollArea, Sense, Slider,
    TextEdit, Ui,
};

use crate::chat::{ChatLog, Role, THINKING};
use crate::circuit::{
    Circuit, Connection, ConnectionId, Morphology, Probe, ProbeId, Section, StimType, Stimulator,
    StimulatorId, SynapseType,
};
use crate::config::WorkbenchConfig;
use crate::dataflow::InFlight;
use crate::error::Result;
use crate::interaction::{CancelKey, EditorEvent, Interaction};
use crate::population::{
    ConnectionStrategy, ConnectionStrategyId, PopulationModel, ProbabilisticProbe,
    ProbabilisticProbeId, StimulationStrategy, StimulationStrategyId,
};
use crate::service::{SimulationClient, SimulationResults, SIMULATION_FAILURE_NOTICE};
use crate::snapshot::{CircuitSnapshot, Mode};
use crate::themes::{schematic_style, HexColor, Styled};
use crate::widgets::{Button, Schematic};

const SCHEMATIC_HEIGHT: f32 = 420.0;

pub struct Workbench {
    title: String,
    client: Option<SimulationClient>,
    mode: Mode,
    circuit: Circuit,
    interaction: Interaction,
    populations: PopulationModel,
    results: SimulationResults,
    simulation: InFlight<Result<SimulationResults>>,
    assistant: InFlight<Result<String>>,
    chat: ChatLog,
    chat_input: String,
    notice: Option<String>,
    cancel_key: CancelKey,
}

impl Workbench {
    pub fn new(config: &WorkbenchConfig) -> Self {
        let (client, notice) = match SimulationClient::new(config) {
            Ok(client) => (Some(client), None),
            Err(err) => {
                log::error!("could not build HTTP client: {err}");
                (None, Some(format!("Simulation server unavailable: {err}")))
            }
        };
        Self {
            title: config.title.clone(),
            client,
            mode: Mode::Individual,
            circuit: Circuit::with_principal_cell(),
            interaction: Interaction::new(),
            populations: PopulationModel::default(),
            results: SimulationResults::default(),
            simulation: InFlight::new(),
            assistant: InFlight::new(),
            chat: ChatLog::new(),
            chat_input: String::new(),
            notice,
            cancel_key: CancelKey::default(),
        }
    }

    fn snapshot(&self) -> CircuitSnapshot {
        CircuitSnapshot::capture(self.mode, &self.circuit, &self.populations)
    }

    fn poll_jobs(&mut self) {
        if let Some(outcome) = self.simulation.take() {
            match outcome {
                Ok(results) => {
                    log::info!("simulation finished: {}", results.summary());
                    self.results = results;
                }
                Err(err) => {
                    log::warn!("simulation failed: {err}");
                    self.notice = Some(SIMULATION_FAILURE_NOTICE.to_owned());
                }
            }
        }
        if let Some(reply) = self.assistant.take() {
            self.chat.receive(reply);
        }
    }

    fn run_simulation(&mut self, ctx: &egui::Context) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let snapshot = self.snapshot();
        log::info!("submitting {snapshot}");
        self.notice = None;
        self.simulation
            .spawn(ctx, move || client.run_simulation(&snapshot));
    }

    fn send_chat(&mut self, ctx: &egui::Context) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let Some(message) = self.chat.submit(&self.chat_input, self.assistant.is_pending()) else {
            return;
        };
        self.chat_input.clear();
        let snapshot = self.snapshot();
        self.assistant
            .spawn(ctx, move || client.ask_assistant(&message, &snapshot));
    }

    fn header(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading(&self.title);
            ui.separator();
            for mode in [Mode::Individual, Mode::Probabilistic] {
                ui.selectable_value(&mut self.mode, mode, mode.label());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let run = ui.add_enabled(self.client.is_some(), Button::new("Run Simulation"));
                if run.clicked() {
                    self.run_simulation(ui.ctx());
                }
                if self.simulation.is_pending() {
                    ui.spinner();
                }
            });
        });
        let mut dismissed = false;
        if let Some(notice) = &self.notice {
            ui.horizontal(|ui| {
                ui.colored_label(ui.visuals().error_fg_color, notice);
                dismissed = ui.small_button("Dismiss").clicked();
            });
        }
        if dismissed {
            self.notice = None;
        }
    }

    fn chat_panel(&mut self, ui: &mut Ui) {
        ui.heading("Assistant");
        let pending = self.assistant.is_pending();
        let input_height = 64.0;
        ScrollArea::vertical()
            .id_salt("chat_log")
            .stick_to_bottom(true)
            .max_height((ui.available_height() - input_height).max(80.0))
            .show(ui, |ui| {
                for message in self.chat.messages() {
                    let (who, color) = match message.role {
                        Role::User => ("You", ui.visuals().hyperlink_color),
                        Role::Assistant => ("Assistant", ui.visuals().text_color()),
                    };
                    ui.label(RichText::new(who).small().color(color));
                    ui.label(&message.content);
                    ui.add_space(4.0);
                }
                if pending {
                    ui.label(RichText::new(THINKING).italics());
                }
            });
        ui.separator();
        let mut send = false;
        ui.horizontal(|ui| {
            let input_id = ui.make_persistent_id("chat_input");
            if ui.memory(|memory| memory.has_focus(input_id)) {
                send |= ui.input_mut(take_send_key);
            }
            ui.add(
                TextEdit::multiline(&mut self.chat_input)
                    .id(input_id)
                    .desired_rows(2)
                    .hint_text("Ask about your circuit...")
                    .desired_width(ui.available_width() - 64.0),
            );
            let can_send = self.client.is_some() && !pending;
            send |= ui.add_enabled(can_send, Button::new("Send")).clicked();
        });
        if send {
            self.send_chat(ui.ctx());
        }
    }

    fn results_panel(&self, ui: &mut Ui) {
        ui.heading("Results");
        if self.simulation.is_pending() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Running simulation...");
            });
        }
        if self.results.is_empty() {
            ui.weak("No results yet.");
            return;
        }
        ui.label(self.results.summary());
        for trace in &self.results.traces {
            ui.horizontal(|ui| {
                let color = trace
                    .color
                    .parse::<HexColor>()
                    .map(HexColor::color)
                    .unwrap_or(ui.visuals().text_color());
                swatch(ui, color);
                ui.label(&trace.label);
                if let Some(peak) = trace.peak_voltage() {
                    ui.weak(format!("peak {peak:.1} mV"));
                }
            });
        }
    }

    fn schematic_panel(&mut self, ui: &mut Ui) {
        ui.heading("Circuit Schematic");
        let style = schematic_style(ui.visuals().dark_mode);
        ui.horizontal(|ui| {
            let drawing = self.interaction.gesture().drawing();
            for (synapse, label) in [(SynapseType::Ampa, "+ AMPA"), (SynapseType::Gaba, "+ GABA")] {
                let button = Button::new(label)
                    .selected(drawing == Some(synapse))
                    .accent(style.synapse_color(synapse));
                if ui.add(button).clicked() {
                    let _ = self.interaction.handle(
                        EditorEvent::ToggleDrawMode(synapse),
                        &mut self.circuit,
                        ui.available_size(),
                    );
                }
            }
            if drawing.is_some() {
                if ui.add(Button::new("Cancel")).clicked() {
                    let _ = self.interaction.handle(
                        EditorEvent::Cancel,
                        &mut self.circuit,
                        ui.available_size(),
                    );
                }
                let hint = match self.interaction.gesture().start_point() {
                    None => "Click the presynaptic neuron.",
                    Some(_) => "Click a soma or dendrite to place the synapse.",
                };
                ui.weak(hint);
            } else {
                ui.weak("Click anatomy to add a probe, click a probe to remove it.");
            }
        });
        ui.add(
            Schematic::new(&mut self.circuit, &mut self.interaction)
                .height(SCHEMATIC_HEIGHT)
                .styled(style),
        );
    }

    fn neuron_manager(&mut self, ui: &mut Ui) {
        ui.heading("Neurons");
        let selected = self.circuit.selected();
        let mut select = None;
        let mut rename = None;
        let mut remove = None;
        for neuron in self.circuit.neurons() {
            ui.horizontal(|ui| {
                if ui.radio(selected == Some(neuron.id), "").clicked() {
                    select = Some(neuron.id);
                }
                let mut name = neuron.name.clone();
                if ui.text_edit_singleline(&mut name).changed() {
                    rename = Some((neuron.id, name));
                }
                if ui.small_button("×").clicked() {
                    remove = Some(neuron.id);
                }
            });
        }
        if ui.add(Button::new("Add Neuron")).clicked() {
            self.circuit.add_neuron();
        }
        if let Some(id) = select {
            self.circuit.select(id);
        }
        if let Some((id, name)) = rename {
            self.circuit.rename_neuron(id, name);
        }
        if let Some(id) = remove {
            self.circuit.remove_neuron(id);
        }

        if let Some(neuron) = self.circuit.selected_neuron() {
            let id = neuron.id;
            ui.separator();
            ui.label(RichText::new(format!("Morphology: {}", neuron.name)).strong());
            if let Some(edited) = morphology_editor(ui, &neuron.morphology) {
                self.circuit.update_morphology(id, |m| *m = edited);
            }
        }
    }

    fn connection_list(&mut self, ui: &mut Ui) {
        ui.heading("Connections");
        let neurons = named(self.circuit.neurons().iter().map(|n| (n.id, n.name.as_str())));
        let mut edit: Option<(ConnectionId, Connection)> = None;
        let mut remove = None;
        for connection in self.circuit.connections() {
            let mut draft = connection.clone();
            let target = self.circuit.neuron(connection.target_id).map(|n| &n.morphology);
            let mut changed = false;
            ui.push_id(connection.id, |ui| {
                ui.horizontal(|ui| {
                    changed |= entity_combo(ui, "source", &neurons, &mut draft.source_id);
                    ui.label("→");
                    changed |= entity_combo(ui, "target", &neurons, &mut draft.target_id);
                    changed |= synapse_combo(ui, &mut draft.synapse_type);
                    if ui.small_button("×").clicked() {
                        remove = Some(connection.id);
                    }
                });
                ui.horizontal(|ui| {
                    changed |= section_combo(ui, "section", target, &mut draft.target_section);
                    changed |= position_slider(ui, draft.target_section, &mut draft.position);
                });
                ui.horizontal(|ui| {
                    ui.label("Weight (µS)");
                    changed |= ui.add(DragValue::new(&mut draft.weight).speed(0.01)).changed();
                    ui.label("Delay (ms)");
                    changed |= ui.add(DragValue::new(&mut draft.delay).speed(0.1)).changed();
                });
            });
            ui.separator();
            if changed {
                edit = Some((connection.id, draft));
            }
        }
        if self.circuit.connections().is_empty() {
            ui.weak("Draw connections on the schematic with + AMPA / + GABA.");
        }
        if let Some((id, draft)) = edit {
            self.circuit.update_connection(id, |c| *c = draft);
        }
        if let Some(id) = remove {
            self.circuit.remove_connection(id);
        }
    }

    fn stimulator_list(&mut self, ui: &mut Ui) {
        ui.heading("Stimulators");
        let neurons = named(self.circuit.neurons().iter().map(|n| (n.id, n.name.as_str())));
        let mut edit: Option<(StimulatorId, Stimulator)> = None;
        let mut remove = None;
        for stimulator in self.circuit.stimulators() {
            let mut draft = stimulator.clone();
            let target = self.circuit.neuron(stimulator.target_id).map(|n| &n.morphology);
            let mut changed = false;
            ui.push_id(stimulator.id, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Stim →");
                    changed |= entity_combo(ui, "target", &neurons, &mut draft.target_id);
                    changed |= stim_combo(ui, &mut draft.stim_type);
                    if ui.small_button("×").clicked() {
                        remove = Some(stimulator.id);
                    }
                });
                ui.horizontal(|ui| {
                    changed |= section_combo(ui, "section", target, &mut draft.target_section);
                    changed |= position_slider(ui, draft.target_section, &mut draft.position);
                });
                ui.horizontal(|ui| {
                    ui.label(weight_label(draft.stim_type));
                    changed |= ui.add(DragValue::new(&mut draft.weight).speed(0.01)).changed();
                    ui.label("Delay (ms)");
                    changed |= ui.add(DragValue::new(&mut draft.delay).speed(0.5)).changed();
                });
            });
            ui.separator();
            if changed {
                edit = Some((stimulator.id, draft));
            }
        }
        let can_add = !self.circuit.neurons().is_empty();
        if ui.add_enabled(can_add, Button::new("Add Stimulator")).clicked() {
            self.circuit.add_stimulator();
        }
        if let Some((id, draft)) = edit {
            self.circuit.update_stimulator(id, |s| *s = draft);
        }
        if let Some(id) = remove {
            self.circuit.remove_stimulator(id);
        }
    }

    fn probe_list(&mut self, ui: &mut Ui) {
        ui.heading("Probes");
        let neurons = named(self.circuit.neurons().iter().map(|n| (n.id, n.name.as_str())));
        let mut edit: Option<(ProbeId, Probe)> = None;
        let mut remove = None;
        for probe in self.circuit.probes() {
            let mut draft = probe.clone();
            let target = self.circuit.neuron(probe.target_id).map(|n| &n.morphology);
            let mut changed = false;
            ui.push_id(probe.id, |ui| {
                ui.horizontal(|ui| {
                    swatch(ui, probe.color.color());
                    changed |= entity_combo(ui, "target", &neurons, &mut draft.target_id);
                    changed |= section_combo(ui, "section", target, &mut draft.section);
                    changed |= position_slider(ui, draft.section, &mut draft.position);
                    if ui.small_button("×").clicked() {
                        remove = Some(probe.id);
                    }
                });
            });
            if changed {
                edit = Some((probe.id, draft));
            }
        }
        if self.circuit.probes().is_empty() {
            ui.weak("Click the schematic to place a probe.");
        }
        let selected = self.circuit.selected();
        if ui
            .add_enabled(selected.is_some(), Button::new("Add Probe to Selected"))
            .clicked()
        {
            if let Some(neuron) = selected {
                self.circuit.add_probe(neuron, Section::Soma, 0.5);
            }
        }
        if let Some((id, draft)) = edit {
            self.circuit.update_probe(id, |p| *p = draft);
        }
        if let Some(id) = remove {
            self.circuit.remove_probe(id);
        }
    }

    fn population_manager(&mut self, ui: &mut Ui) {
        ui.heading("Populations");
        let selected = self.populations.selected();
        let mut select = None;
        let mut edit = None;
        let mut remove = None;
        for population in self.populations.populations() {
            ui.horizontal(|ui| {
                if ui.radio(selected == Some(population.id), "").clicked() {
                    select = Some(population.id);
                }
                let mut name = population.name.clone();
                let mut quantity = population.quantity;
                let mut changed = ui.text_edit_singleline(&mut name).changed();
                changed |= ui
                    .add(DragValue::new(&mut quantity).range(0..=100_000))
                    .changed();
                if changed {
                    edit = Some((population.id, name, quantity));
                }
                if ui.small_button("×").clicked() {
                    remove = Some(population.id);
                }
            });
        }
        if ui.add(Button::new("Add Population")).clicked() {
            self.populations.add_population();
        }
        if let Some(id) = select {
            self.populations.select(id);
        }
        if let Some((id, name, quantity)) = edit {
            self.populations.update_population(id, |p| {
                p.name = name;
                p.quantity = quantity;
            });
        }
        if let Some(id) = remove {
            self.populations.remove_population(id);
        }

        if let Some(population) = self.populations.selected_population() {
            let id = population.id;
            ui.separator();
            ui.label(RichText::new(format!("Morphology: {}", population.name)).strong());
            if let Some(edited) = morphology_editor(ui, &population.morphology) {
                self.populations
                    .update_population(id, |p| p.morphology = edited);
            }
        }
    }

    fn connection_rules(&mut self, ui: &mut Ui) {
        ui.heading("Connection Rules");
        let pops = named(
            self.populations
                .populations()
                .iter()
                .map(|p| (p.id, p.name.as_str())),
        );
        let mut edit: Option<(ConnectionStrategyId, ConnectionStrategy)> = None;
        let mut remove = None;
        for rule in self.populations.connection_strategies() {
            let mut draft = rule.clone();
            let mut changed = false;
            ui.push_id(rule.id, |ui| {
                ui.horizontal(|ui| {
                    changed |= entity_combo(ui, "source", &pops, &mut draft.source_pop_id);
                    ui.label("→");
                    changed |= entity_combo(ui, "target", &pops, &mut draft.target_pop_id);
                    changed |= synapse_combo(ui, &mut draft.synapse_type);
                    if ui.small_button("×").clicked() {
                        remove = Some(rule.id);
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Probability");
                    changed |= ui
                        .add(
                            DragValue::new(&mut draft.probability)
                                .speed(0.05)
                                .range(0.0..=1.0),
                        )
                        .changed();
                    changed |= section_combo(ui, "section", None, &mut draft.target_section);
                });
                ui.horizontal(|ui| {
                    ui.label("Weight (µS)");
                    changed |= ui.add(DragValue::new(&mut draft.weight).speed(0.01)).changed();
                    ui.label("Delay (ms)");
                    changed |= ui.add(DragValue::new(&mut draft.delay).speed(0.1)).changed();
                });
            });
            ui.separator();
            if changed {
                edit = Some((rule.id, draft));
            }
        }
        let can_add = !self.populations.populations().is_empty();
        if ui.add_enabled(can_add, Button::new("Add Connection Rule")).clicked() {
            self.populations.add_connection_strategy();
        }
        if let Some((id, draft)) = edit {
            self.populations.update_connection_strategy(id, |r| *r = draft);
        }
        if let Some(id) = remove {
            self.populations.remove_connection_strategy(id);
        }
    }

    fn stimulation_rules(&mut self, ui: &mut Ui) {
        ui.heading("Stimulation Rules");
        let pops = named(
            self.populations
                .populations()
                .iter()
                .map(|p| (p.id, p.name.as_str())),
        );
        let mut edit: Option<(StimulationStrategyId, StimulationStrategy)> = None;
        let mut remove = None;
        for rule in self.populations.stimulation_strategies() {
            let mut draft = rule.clone();
            let mut changed = false;
            ui.push_id(rule.id, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Stim →");
                    changed |= entity_combo(ui, "target", &pops, &mut draft.target_pop_id);
                    changed |= stim_combo(ui, &mut draft.stim_type);
                    if ui.small_button("×").clicked() {
                        remove = Some(rule.id);
                    }
                });
                changed |= ui
                    .checkbox(&mut draft.is_noisy, "Noisy Background")
                    .changed();
                ui.add_enabled_ui(!draft.is_noisy, |ui| {
                    ui.horizontal(|ui| {
                        changed |= section_combo(ui, "section", None, &mut draft.target_section);
                        ui.label("Percentage (%)");
                        changed |= ui
                            .add(DragValue::new(&mut draft.percentage).range(0.0..=100.0))
                            .changed();
                    });
                });
                ui.horizontal(|ui| {
                    ui.label(weight_label(draft.stim_type));
                    changed |= ui.add(DragValue::new(&mut draft.weight).speed(0.01)).changed();
                    ui.add_enabled_ui(!draft.is_noisy, |ui| {
                        ui.label("Delay (ms)");
                        changed |= ui.add(DragValue::new(&mut draft.delay).speed(0.5)).changed();
                    });
                });
            });
            ui.separator();
            if changed {
                edit = Some((rule.id, draft));
            }
        }
        let can_add = !self.populations.populations().is_empty();
        if ui.add_enabled(can_add, Button::new("Add Stimulation Rule")).clicked() {
            self.populations.add_stimulation_strategy();
        }
        if let Some((id, draft)) = edit {
            self.populations.update_stimulation_strategy(id, |r| *r = draft);
        }
        if let Some(id) = remove {
            self.populations.remove_stimulation_strategy(id);
        }
    }

    fn recording_rules(&mut self, ui: &mut Ui) {
        ui.heading("Recording Rules");
        let pops = named(
            self.populations
                .populations()
                .iter()
                .map(|p| (p.id, p.name.as_str())),
        );
        let mut edit: Option<(ProbabilisticProbeId, ProbabilisticProbe)> = None;
        let mut remove = None;
        for probe in self.populations.probes() {
            let mut draft = probe.clone();
            let morphology = self
                .populations
                .population(probe.target_pop_id)
                .map(|p| &p.morphology);
            let mut changed = false;
            ui.push_id(probe.id, |ui| {
                ui.horizontal(|ui| {
                    swatch(ui, draft.color.color());
                    ui.label("Record");
                    changed |= ui
                        .add(DragValue::new(&mut draft.count).range(1..=1_000))
                        .changed();
                    ui.label("from");
                    changed |= entity_combo(ui, "target", &pops, &mut draft.target_pop_id);
                    changed |= section_combo(ui, "section", morphology, &mut draft.section);
                    if ui.small_button("×").clicked() {
                        remove = Some(probe.id);
                    }
                });
            });
            if changed {
                edit = Some((probe.id, draft));
            }
        }
        let can_add = !self.populations.populations().is_empty();
        if ui.add_enabled(can_add, Button::new("Add Recording Rule")).clicked() {
            self.populations.add_probe();
        }
        if let Some((id, draft)) = edit {
            self.populations.update_probe(id, |p| *p = draft);
        }
        if let Some(id) = remove {
            self.populations.remove_probe(id);
        }
    }
}

impl eframe::App for Workbench {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_jobs();
        if let Some(event) = self.cancel_key.poll(ctx) {
            let _ = self
                .interaction
                .handle(event, &mut self.circuit, egui::Vec2::ZERO);
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.header(ui));

        egui::SidePanel::right("assistant")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.chat_panel(ui));

        egui::SidePanel::left("configuration")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                ScrollArea::vertical().id_salt("forms").show(ui, |ui| match self.mode {
                    Mode::Individual => {
                        self.neuron_manager(ui);
                        ui.separator();
                        self.stimulator_list(ui);
                        ui.separator();
                        self.connection_list(ui);
                    }
                    Mode::Probabilistic => {
                        self.population_manager(ui);
                        ui.separator();
                        self.connection_rules(ui);
                        ui.separator();
                        self.stimulation_rules(ui);
                        ui.separator();
                        self.recording_rules(ui);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().id_salt("main").show(ui, |ui| {
                if self.mode == Mode::Individual {
                    self.schematic_panel(ui);
                    ui.separator();
                    self.probe_list(ui);
                    ui.separator();
                }
                self.results_panel(ui);
            });
        });
    }
}

/// Enter sends the chat message; Shift+Enter falls through to the editor as a newline.
fn take_send_key(input: &mut egui::InputState) -> bool {
    !input.modifiers.shift && input.consume_key(Modifiers::NONE, Key::Enter)
}

fn named<'a, I>(entries: impl Iterator<Item = (I, &'a str)>) -> Vec<(I, String)> {
    entries.map(|(id, name)| (id, name.to_owned())).collect()
}

fn swatch(ui: &mut Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
    ui.painter().circle_filled(rect.center(), 5.0, color);
}

fn weight_label(stim: StimType) -> &'static str {
    match stim {
        StimType::IClamp => "Amp (nA)",
        StimType::Ampa | StimType::Gaba => "Weight (µS)",
    }
}

fn entity_combo<I: Copy + PartialEq>(
    ui: &mut Ui,
    salt: &str,
    options: &[(I, String)],
    value: &mut I,
) -> bool {
    let before = *value;
    let current = options
        .iter()
        .find(|(id, _)| *id == *value)
        .map(|(_, name)| name.as_str())
        .unwrap_or("?");
    ComboBox::from_id_salt(salt)
        .selected_text(current)
        .show_ui(ui, |ui| {
            for (id, name) in options {
                ui.selectable_value(value, *id, name);
            }
        });
    *value != before
}

fn synapse_combo(ui: &mut Ui, value: &mut SynapseType) -> bool {
    let before = *value;
    ComboBox::from_id_salt("synapse")
        .selected_text(value.label())
        .show_ui(ui, |ui| {
            for synapse in [SynapseType::Ampa, SynapseType::Gaba] {
                ui.selectable_value(value, synapse, synapse.label());
            }
        });
    *value != before
}

fn stim_combo(ui: &mut Ui, value: &mut StimType) -> bool {
    let before = *value;
    ComboBox::from_id_salt("stim_type")
        .selected_text(value.label())
        .show_ui(ui, |ui| {
            for stim in StimType::ALL {
                ui.selectable_value(value, stim, stim.label());
            }
        });
    *value != before
}

/// Sections offered for `morphology`; every section when the target is unknown.
fn section_combo(
    ui: &mut Ui,
    salt: &str,
    morphology: Option<&Morphology>,
    value: &mut Section,
) -> bool {
    let before = *value;
    ComboBox::from_id_salt(salt)
        .selected_text(value.label())
        .show_ui(ui, |ui| {
            for section in Section::ALL {
                if morphology.is_none_or(|m| m.includes(section)) {
                    ui.selectable_value(value, section, section.label());
                }
            }
        });
    *value != before
}

fn position_slider(ui: &mut Ui, section: Section, position: &mut f32) -> bool {
    ui.add_enabled(
        section != Section::Soma,
        Slider::new(position, 0.0..=1.0).text("position"),
    )
    .changed()
}

fn morphology_editor(ui: &mut Ui, morphology: &Morphology) -> Option<Morphology> {
    let mut draft = morphology.clone();
    let mut changed = false;
    egui::Grid::new("morphology")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Soma diameter (µm)");
            changed |= ui.add(Slider::new(&mut draft.soma_diam, 5.0..=50.0)).changed();
            ui.end_row();

            changed |= ui.checkbox(&mut draft.include_apical, "Apical dendrite").changed();
            ui.end_row();
            if draft.include_apical {
                ui.label("  Length (µm)");
                changed |= ui.add(Slider::new(&mut draft.apical_l, 10.0..=800.0)).changed();
                ui.end_row();
                ui.label("  Diameter (µm)");
                changed |= ui.add(Slider::new(&mut draft.apical_diam, 1.0..=10.0)).changed();
                ui.end_row();
            }

            changed |= ui.checkbox(&mut draft.include_basal, "Basal dendrite").changed();
            ui.end_row();
            if draft.include_basal {
                ui.label("  Length (µm)");
                changed |= ui.add(Slider::new(&mut draft.basal_l, 10.0..=500.0)).changed();
                ui.end_row();
                ui.label("  Diameter (µm)");
                changed |= ui.add(Slider::new(&mut draft.basal_diam, 1.0..=10.0)).changed();
                ui.end_row();
            }
        });
    changed.then_some(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter_with(modifiers: Modifiers) -> (bool, bool) {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            modifiers,
            events: vec![egui::Event::Key {
                key: Key::Enter,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers,
            }],
            ..Default::default()
        };
        let mut seen = (false, false);
        let _ = ctx.run(input, |ctx| {
            if !seen.0 {
                let sent = ctx.input_mut(take_send_key);
                let still_there = ctx.input(|i| i.key_pressed(Key::Enter));
                seen = (sent, still_there);
            }
        });
        seen
    }

    #[test]
    fn plain_enter_sends_and_is_consumed() {
        assert_eq!(enter_with(Modifiers::NONE), (true, false));
    }

    #[test]
    fn shift_enter_is_left_for_the_editor() {
        assert_eq!(enter_with(Modifiers::SHIFT), (false, true));
    }
}
