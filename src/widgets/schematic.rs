use eframe::egui::{self, vec2, CursorIcon, Pos2, Rect, Response, Sense, Stroke, Ui, Widget};

use crate::circuit::Circuit;
use crate::interaction::{EditOutcome, EditorEvent, Gesture, Interaction};
use crate::render::SchematicScene;
use crate::themes::{SchematicStyle, Styled};

/// The editable circuit diagram.
///
/// Translates this frame's pointer input into [`EditorEvent`]s, applies them to the
/// circuit, then repaints the whole scene. The response is marked changed whenever the
/// circuit was edited.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct Schematic<'a> {
    circuit: &'a mut Circuit,
    interaction: &'a mut Interaction,
    height: f32,
    style: Option<SchematicStyle>,
}

impl<'a> Schematic<'a> {
    pub fn new(circuit: &'a mut Circuit, interaction: &'a mut Interaction) -> Self {
        Self {
            circuit,
            interaction,
            height: 400.0,
            style: None,
        }
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }
}

impl Styled for Schematic<'_> {
    type Style = SchematicStyle;

    fn set_style(&mut self, style: Option<Self::Style>) {
        self.style = style;
    }
}

/// Primary-button pointer state for one frame, in screen coordinates.
#[derive(Clone, Copy, Debug, Default)]
struct PointerFrame {
    pressed: bool,
    released: bool,
    moved: bool,
    press_origin: Option<Pos2>,
    latest: Option<Pos2>,
}

impl PointerFrame {
    fn read(ui: &Ui) -> Self {
        ui.input(|input| {
            let pointer = &input.pointer;
            Self {
                pressed: pointer.primary_pressed(),
                released: pointer.primary_released(),
                moved: pointer.delta() != egui::Vec2::ZERO,
                press_origin: pointer.press_origin(),
                latest: pointer.latest_pos(),
            }
        })
    }
}

/// Every release that completes a press begun on the surface is a click, however long
/// the button was held. `press_inside` carries that press across frames.
fn pointer_events(
    frame: PointerFrame,
    rect: Rect,
    dragging: bool,
    press_inside: &mut bool,
) -> Vec<EditorEvent> {
    let to_surface = |p: Pos2| (p - rect.min).to_pos2();

    let mut events = Vec::new();
    if frame.pressed {
        let origin = frame
            .press_origin
            .or(frame.latest)
            .filter(|p| rect.contains(*p));
        *press_inside = origin.is_some();
        if let Some(origin) = origin {
            events.push(EditorEvent::PointerDown(to_surface(origin)));
        }
    }
    if let Some(pos) = frame.latest.filter(|_| frame.moved) {
        if rect.contains(pos) {
            events.push(EditorEvent::PointerMove(to_surface(pos)));
        } else if dragging {
            // Leaving the surface ends a drag.
            events.push(EditorEvent::PointerUp);
        }
    }
    if frame.released {
        events.push(EditorEvent::PointerUp);
        if std::mem::take(press_inside) {
            if let Some(pos) = frame.latest.filter(|p| rect.contains(*p)) {
                events.push(EditorEvent::Click(to_surface(pos)));
            }
        }
    }
    events
}

impl Widget for Schematic<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let Self {
            circuit,
            interaction,
            height,
            style,
        } = self;

        let style = style.unwrap_or_else(|| SchematicStyle::from(ui.style().as_ref()));
        let size = vec2(ui.available_width(), height);
        let (rect, mut response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        let surface = rect.size();

        interaction.forget_missing(circuit);
        let dragging = matches!(
            interaction.gesture(),
            Gesture::DraggingProbe(_) | Gesture::DraggingConnectionEndpoint(_)
        );
        let press_id = response.id.with("press_inside");
        let mut press_inside = ui.data(|data| data.get_temp(press_id)).unwrap_or(false);
        let events = pointer_events(PointerFrame::read(ui), rect, dragging, &mut press_inside);
        ui.data_mut(|data| data.insert_temp(press_id, press_inside));

        let mut changed = false;
        for event in events {
            if interaction.handle(event, circuit, surface) == EditOutcome::CircuitChanged {
                changed = true;
            }
        }
        if changed {
            response.mark_changed();
        }

        if response.hovered() {
            let icon = match interaction.gesture() {
                Gesture::DrawingConnection { .. } => CursorIcon::Crosshair,
                Gesture::DraggingProbe(_) | Gesture::DraggingConnectionEndpoint(_) => {
                    CursorIcon::Grabbing
                }
                Gesture::Idle => CursorIcon::Default,
            };
            ui.ctx().set_cursor_icon(icon);
        }

        if !ui.is_rect_visible(rect) {
            return response;
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, style.background);
        painter.rect_stroke(
            rect,
            0.0,
            Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color),
            egui::StrokeKind::Inside,
        );
        SchematicScene::build(circuit, interaction, surface).paint(&painter, rect.min, &style);

        response
    }
}
