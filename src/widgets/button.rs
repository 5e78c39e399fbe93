use eframe::egui::{
    self, pos2, vec2, Color32, NumExt as _, Rect, Response, Sense, Stroke, TextStyle, Ui, Widget,
    WidgetInfo, WidgetText, WidgetType,
};

use crate::themes::{blend, text_color_on, ButtonStyle, Styled};

/// Toolbar button with a drop shadow. A selected button is filled with its accent.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct Button {
    text: WidgetText,
    selected: bool,
    accent: Option<Color32>,
    style: Option<ButtonStyle>,
}

impl Button {
    pub fn new(text: impl Into<WidgetText>) -> Self {
        Self {
            text: text.into(),
            selected: false,
            accent: None,
            style: None,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Color used for the outline on hover and for the fill while selected.
    pub fn accent(mut self, accent: Color32) -> Self {
        self.accent = Some(accent);
        self
    }
}

impl Styled for Button {
    type Style = ButtonStyle;

    fn set_style(&mut self, style: Option<Self::Style>) {
        self.style = style;
    }
}

impl Widget for Button {
    fn ui(self, ui: &mut Ui) -> Response {
        let Self {
            text,
            selected,
            accent,
            style,
        } = self;

        let enabled = ui.is_enabled();
        let bstyle = style.unwrap_or_else(|| ButtonStyle::from(ui.style().as_ref()));
        let shadow_offset = bstyle.shadow_offset;
        let shadow_inset = vec2(shadow_offset.x.max(0.0), shadow_offset.y.max(0.0));
        let padding = ui.spacing().button_padding;

        let label_text = text.text().to_string();
        let max_text_width =
            (ui.available_width() - padding.x * 2.0 - shadow_inset.x).at_least(0.0);
        let galley = text.into_galley(
            ui,
            Some(egui::TextWrapMode::Truncate),
            max_text_width,
            TextStyle::Button,
        );

        let mut body_size = galley.size() + padding * 2.0;
        body_size.y = body_size.y.at_least(ui.spacing().interact_size.y);
        let (outer_rect, response) = ui.allocate_exact_size(body_size + shadow_inset, Sense::click());

        response.widget_info(move || {
            WidgetInfo::selected(WidgetType::Button, enabled, selected, label_text.as_str())
        });

        if !ui.is_rect_visible(outer_rect) {
            return response;
        }

        let accent = accent.unwrap_or(bstyle.accent);
        let is_down = enabled && response.is_pointer_button_down_on();
        let hovered = response.hovered() || response.has_focus();

        let base_fill = if selected { accent } else { bstyle.fill };
        let fill = if enabled {
            base_fill
        } else {
            blend(base_fill, ui.visuals().window_fill, 0.65)
        };
        let stroke_color = if enabled && (selected || hovered || is_down) {
            accent
        } else {
            bstyle.outline
        };

        let mut body_rect =
            Rect::from_min_max(outer_rect.min, outer_rect.max - shadow_inset).intersect(outer_rect);
        if is_down {
            body_rect = body_rect.translate(shadow_offset);
        }

        let painter = ui.painter();
        if enabled && !is_down {
            painter.rect_filled(body_rect.translate(shadow_offset), bstyle.rounding, bstyle.shadow);
        }
        painter.rect_filled(body_rect, bstyle.rounding, fill);
        painter.rect_stroke(
            body_rect,
            bstyle.rounding,
            Stroke::new(1.0, stroke_color),
            egui::StrokeKind::Inside,
        );

        let ink = if selected { text_color_on(fill) } else { bstyle.text };
        let text_color = if enabled { ink } else { blend(ink, fill, 0.55) };
        let text_pos = pos2(
            body_rect.center().x - galley.size().x / 2.0,
            body_rect.center().y - galley.size().y / 2.0,
        );
        painter.galley(text_pos, galley, text_color);

        response
    }
}
