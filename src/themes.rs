use egui::style::{Selection, WidgetVisuals, Widgets};
use egui::{Color32, Stroke, Style, ThemePreference, Vec2, Visuals};

use crate::circuit::SynapseType;

mod palette;
mod style;
pub use palette::{distinct_color, text_color_on, HexColor};
pub use style::Styled;

/// Colors used by the circuit schematic.
#[derive(Clone, Debug, PartialEq)]
pub struct SchematicStyle {
    pub background: Color32,
    pub ink: Color32,
    pub excitatory: Color32,
    pub inhibitory: Color32,
    pub soma_fill: Color32,
    pub soma_selected_fill: Color32,
    pub shaft_width: f32,
    pub edge_width: f32,
}

impl SchematicStyle {
    pub fn synapse_color(&self, synapse: SynapseType) -> Color32 {
        match synapse {
            SynapseType::Ampa => self.excitatory,
            SynapseType::Gaba => self.inhibitory,
        }
    }
}

/// Return a `SchematicStyle` preset for light/dark mode.
pub fn schematic_style(dark_mode: bool) -> SchematicStyle {
    if dark_mode {
        SchematicStyle {
            background: Color32::from_rgb(0x1e, 0x1f, 0x24),
            ink: Color32::from_rgb(0xe4, 0xe4, 0xe8),
            excitatory: Color32::from_rgb(0x3c, 0xb4, 0x4b),
            inhibitory: Color32::from_rgb(0xe6, 0x4b, 0x4b),
            soma_fill: Color32::from_rgb(0x2c, 0x2d, 0x34),
            soma_selected_fill: Color32::from_rgb(0x4a, 0x4a, 0x8a),
            shaft_width: 1.0,
            edge_width: 2.0,
        }
    } else {
        SchematicStyle {
            background: Color32::WHITE,
            ink: Color32::BLACK,
            excitatory: Color32::from_rgb(0x00, 0x80, 0x00),
            inhibitory: Color32::from_rgb(0xff, 0x00, 0x00),
            soma_fill: Color32::WHITE,
            soma_selected_fill: Color32::from_rgb(0xd9, 0xd9, 0xff),
            shaft_width: 1.0,
            edge_width: 2.0,
        }
    }
}

impl From<&Style> for SchematicStyle {
    fn from(style: &Style) -> Self {
        schematic_style(style.visuals.dark_mode)
    }
}

/// Style for the workbench `Button`.
#[derive(Clone, Debug, PartialEq)]
pub struct ButtonStyle {
    pub fill: Color32,
    pub outline: Color32,
    pub accent: Color32,
    pub text: Color32,
    pub shadow: Color32,
    pub shadow_offset: Vec2,
    pub rounding: f32,
}

impl From<&Style> for ButtonStyle {
    fn from(style: &Style) -> Self {
        let visuals = &style.visuals;
        let text = visuals.text_color();
        Self {
            fill: visuals.widgets.inactive.bg_fill,
            outline: blend(text, visuals.window_fill, 0.4),
            accent: visuals.selection.stroke.color,
            text,
            shadow: blend(visuals.window_fill, text, 0.3),
            shadow_offset: egui::vec2(2.0, 2.0),
            rounding: 2.0,
        }
    }
}

// Simple sRGB linear interpolation for quick palette derivation
pub fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let r = (a.r() as f32 * (1.0 - t) + b.r() as f32 * t).round() as u8;
    let g = (a.g() as f32 * (1.0 - t) + b.g() as f32 * t).round() as u8;
    let bch = (a.b() as f32 * (1.0 - t) + b.b() as f32 * t).round() as u8;
    Color32::from_rgb(r, g, bch)
}

/// Flat, lab-bench visuals shared by the light and dark workbench themes.
fn bench_visuals(
    foreground: Color32,
    background: Color32,
    accent: Color32,
    mut base_visuals: Visuals,
) -> Visuals {
    let border = blend(foreground, background, 0.6);
    let control_fill = blend(background, foreground, 0.04);
    let control_fill_hover = blend(background, foreground, 0.08);
    let control_fill_active = blend(background, accent, 0.15);

    base_visuals.window_fill = background;
    base_visuals.panel_fill = background;
    base_visuals.faint_bg_color = blend(background, foreground, 0.03);
    base_visuals.extreme_bg_color = control_fill;
    base_visuals.selection = Selection {
        bg_fill: blend(background, accent, 0.2),
        stroke: Stroke::new(1.5, accent),
    };
    base_visuals.window_stroke = Stroke::new(1.0, border);

    let widget = |fill: Color32, stroke: Stroke| WidgetVisuals {
        bg_fill: fill,
        weak_bg_fill: fill,
        bg_stroke: stroke,
        fg_stroke: Stroke::new(1.0, foreground),
        corner_radius: 2.0.into(),
        expansion: 0.0,
    };
    base_visuals.widgets = Widgets {
        noninteractive: widget(background, Stroke::new(1.0, border)),
        inactive: widget(control_fill, Stroke::new(1.0, border)),
        hovered: widget(control_fill_hover, Stroke::new(1.4, border)),
        active: widget(control_fill_active, Stroke::new(1.4, accent)),
        open: widget(control_fill_hover, Stroke::new(1.4, accent)),
    };

    base_visuals
}

fn bench_style(visuals: Visuals) -> Style {
    let mut style = Style::default();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);
    style.spacing.interact_size = egui::vec2(34.0, 24.0);
    style.animation_time = 0.12;
    style.visuals = visuals;
    style
}

pub fn workbench_light() -> Style {
    bench_style(bench_visuals(
        Color32::from_rgb(0x1f, 0x23, 0x2b),
        Color32::from_rgb(0xf4, 0xf6, 0xf9),
        Color32::from_rgb(0x43, 0x63, 0xd8),
        Visuals::light(),
    ))
}

pub fn workbench_dark() -> Style {
    bench_style(bench_visuals(
        Color32::from_rgb(0xe4, 0xe4, 0xe8),
        Color32::from_rgb(0x1e, 0x1f, 0x24),
        Color32::from_rgb(0x6f, 0x8b, 0xf0),
        Visuals::dark(),
    ))
}

/// Follow the desktop's light/dark setting, falling back to light.
pub fn detect_theme() -> ThemePreference {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => ThemePreference::Dark,
        Ok(dark_light::Mode::Light) => ThemePreference::Light,
        Ok(dark_light::Mode::Unspecified) | Err(_) => ThemePreference::Light,
    }
}
