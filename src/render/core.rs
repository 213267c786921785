use serde::Serialize;

use crate::color::{Rgb, TextColor};
use crate::geometry::Bounds;
use crate::registry::{Annotation, Rectangle, Registry};

/// Draw-list parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderSettings {
    /// Gap left between a rectangle's fill and its logical bounds.
    pub inset: f64,
    /// Distance from a rectangle's left edge to its label.
    pub label_padding: f64,
    pub annotation_color: Rgb,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            inset: 1.0,
            label_padding: 5.0,
            annotation_color: Rgb::BLACK,
        }
    }
}

/// Horizontal text anchor, as understood by canvas toolkits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    West,
    East,
}

/// Backend-agnostic primitive a host renderer turns into pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    FillRect {
        bounds: Bounds,
        color: String,
    },
    Text {
        x: f64,
        y: f64,
        anchor: Anchor,
        text: String,
        color: String,
    },
}

/// Produces draw lists from finished registries.
#[derive(Debug, Clone, Default)]
pub struct DrawListRenderer {
    settings: RenderSettings,
}

impl DrawListRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Rectangles in registry order, each fill followed by its label, then
    /// every annotation.
    pub fn render(&self, registry: &Registry) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(registry.len() * 2 + registry.annotations().len());
        for (_, rect) in registry.iter() {
            self.render_rect(&mut commands, rect);
        }
        for note in registry.annotations() {
            commands.push(self.annotation(note));
        }
        commands
    }

    fn render_rect(&self, commands: &mut Vec<DrawCommand>, rect: &Rectangle) {
        commands.push(DrawCommand::FillRect {
            bounds: rect.bounds.inset(self.settings.inset),
            color: rect.fill().to_hex(),
        });
        commands.push(DrawCommand::Text {
            x: rect.bounds.x0 + self.settings.label_padding,
            y: rect.bounds.mid_y(),
            anchor: Anchor::West,
            text: rect.display_text.clone(),
            color: text_hex(rect.text_color()),
        });
    }

    fn annotation(&self, note: &Annotation) -> DrawCommand {
        DrawCommand::Text {
            x: note.anchor_x,
            y: note.mid_y(),
            anchor: Anchor::East,
            text: note.text.clone(),
            color: self.settings.annotation_color.to_hex(),
        }
    }
}

fn text_hex(color: TextColor) -> String {
    color.rgb().to_hex()
}

/// Draw list with default settings.
pub fn draw_commands(registry: &Registry) -> Vec<DrawCommand> {
    DrawListRenderer::default().render(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorPolicy, ColorSpec};
    use crate::item::Item;
    use crate::layout::{LayoutConfig, build};
    use crate::selection::toggle_at;

    fn bob_registry() -> Registry {
        let items = vec![Item::bare("Bob"), Item::bare("Bob")];
        let config = LayoutConfig::new(30, 20, 1, 1).unwrap();
        let spec = ColorSpec::fallback_only(Rgb::new(10, 10, 10));
        build(&items, &spec, &config, ColorPolicy::WeightedBlend).unwrap()
    }

    #[test]
    fn rectangle_becomes_fill_label_pair() {
        let commands = draw_commands(&bob_registry());
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0],
            DrawCommand::FillRect {
                bounds: Bounds::new(1.0, 1.0, 29.0, 19.0),
                color: "#0a0a0a".into()
            }
        );
        assert_eq!(
            commands[1],
            DrawCommand::Text {
                x: 5.0,
                y: 10.0,
                anchor: Anchor::West,
                text: "Bob".into(),
                color: "#ffffff".into()
            }
        );
        assert_eq!(
            commands[2],
            DrawCommand::Text {
                x: 30.0,
                y: 10.0,
                anchor: Anchor::East,
                text: "Bob : 2".into(),
                color: "#000000".into()
            }
        );
    }

    #[test]
    fn selection_changes_drawn_fill() {
        let mut registry = bob_registry();
        toggle_at(&mut registry, 2.0, 2.0);
        let commands = draw_commands(&registry);
        assert!(matches!(&commands[0], DrawCommand::FillRect { color, .. } if color == "#3c3c3c"));
    }

    #[test]
    fn custom_settings_move_fill_and_labels() {
        let settings = RenderSettings {
            inset: 0.0,
            label_padding: 2.0,
            annotation_color: Rgb::new(200, 0, 0),
        };
        let renderer = DrawListRenderer::new(settings);
        assert_eq!(renderer.settings(), &settings);

        let commands = renderer.render(&bob_registry());
        assert!(matches!(
            &commands[0],
            DrawCommand::FillRect { bounds, .. } if *bounds == Bounds::new(0.0, 0.0, 30.0, 20.0)
        ));
        assert!(matches!(&commands[1], DrawCommand::Text { x, .. } if *x == 2.0));
        assert!(matches!(&commands[2], DrawCommand::Text { color, .. } if color == "#c80000"));
    }

    #[test]
    fn commands_serialize_tagged() {
        let json = serde_json::to_string(&draw_commands(&bob_registry())[0]).unwrap();
        assert!(json.starts_with("{\"kind\":\"fill_rect\""));
    }
}
