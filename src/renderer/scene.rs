//! Scene building
//!
//! Turns a `GameState` into an ordered list of 2D draw commands. Kept free of
//! any browser types so it can be tested natively; `CanvasRenderer` executes
//! the list on a real canvas.

use glam::Vec2;

use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, Rank};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 1.0);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 1.0);
    pub const BACKGROUND: Color = Color::hex(0xFFF8E1);
    pub const DANGER: Color = Color::hex(0xFF6B6B);
    pub const TEXT: Color = Color::hex(0x333333);

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from 0xRRGGBB
    pub const fn hex(rgb: u32) -> Self {
        Self::rgba((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 1.0)
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        size: Vec2,
    },
    Rect {
        pos: Vec2,
        size: Vec2,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Option<Color>,
        /// Colour and line width
        stroke: Option<(Color, f32)>,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
        dashed: bool,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        align: Align,
        color: Color,
    },
}

fn text(pos: Vec2, text: impl Into<String>, size: f32, align: Align, color: Color) -> DrawCommand {
    DrawCommand::Text {
        pos,
        text: text.into(),
        size,
        align,
        color,
    }
}

/// Shadow, body, highlight and label of one piece
fn push_piece(out: &mut Vec<DrawCommand>, rank: Rank, pos: Vec2) {
    let r = rank.radius();
    out.push(DrawCommand::Circle {
        center: pos + Vec2::splat(3.0),
        radius: r,
        fill: Some(Color::BLACK.with_alpha(0.1)),
        stroke: None,
    });
    out.push(DrawCommand::Circle {
        center: pos,
        radius: r,
        fill: Some(Color::hex(rank.info().color)),
        stroke: Some((Color::BLACK, 2.0)),
    });
    out.push(DrawCommand::Circle {
        center: pos - Vec2::splat(r * 0.3),
        radius: r * 0.3,
        fill: Some(Color::WHITE.with_alpha(0.3)),
        stroke: None,
    });
    out.push(text(
        pos + Vec2::new(0.0, 5.0),
        rank.name(),
        (r / 3.0).max(12.0),
        Align::Center,
        Color::WHITE,
    ));
}

fn push_overlay(out: &mut Vec<DrawCommand>, size: Vec2, alpha: f32, lines: [(String, f32, f32); 2]) {
    out.push(DrawCommand::Rect {
        pos: Vec2::ZERO,
        size,
        color: Color::BLACK.with_alpha(alpha),
    });
    for (line, font_size, dy) in lines {
        out.push(text(
            Vec2::new(size.x / 2.0, size.y / 2.0 + dy),
            line,
            font_size,
            Align::Center,
            Color::WHITE,
        ));
    }
}

/// Build the draw list for one frame
pub fn build_scene(state: &GameState, settings: &Settings) -> Vec<DrawCommand> {
    let container = &state.container;
    let size = Vec2::new(container.right, container.bottom);
    let mut out = Vec::with_capacity(16 + state.pieces.len() * 4);

    out.push(DrawCommand::Clear { size });
    out.push(DrawCommand::Rect {
        pos: Vec2::ZERO,
        size,
        color: Color::BACKGROUND,
    });

    // Danger line and warning
    out.push(DrawCommand::Line {
        from: Vec2::new(container.left, container.danger_line),
        to: Vec2::new(container.right, container.danger_line),
        color: Color::DANGER,
        width: 2.0,
        dashed: false,
    });
    out.push(text(
        Vec2::new(size.x / 2.0, container.danger_line - 10.0),
        "Danger zone - game over if pieces settle above this line",
        14.0,
        Align::Center,
        Color::DANGER,
    ));

    if settings.show_merge_effects {
        for effect in &state.effects {
            out.push(DrawCommand::Circle {
                center: effect.pos,
                radius: effect.radius + 10.0,
                fill: Some(Color::WHITE.with_alpha(effect.alpha)),
                stroke: None,
            });
            out.push(DrawCommand::Circle {
                center: effect.pos,
                radius: effect.radius,
                fill: None,
                stroke: Some((Color::WHITE.with_alpha(effect.alpha), 4.0)),
            });
        }
    }

    for piece in &state.pieces {
        push_piece(&mut out, piece.rank, piece.pos);
    }

    if state.phase == GamePhase::Playing {
        if let Some(pending) = &state.pending {
            push_piece(&mut out, pending.rank, pending.pos);
            if settings.show_drop_guide {
                out.push(DrawCommand::Line {
                    from: pending.pos + Vec2::new(0.0, pending.radius()),
                    to: Vec2::new(pending.pos.x, container.bottom),
                    color: Color::BLACK.with_alpha(0.3),
                    width: 1.0,
                    dashed: true,
                });
            }
        }
    }

    out.push(text(
        Vec2::new(10.0, 30.0),
        format!("Score: {}", state.score),
        24.0,
        Align::Left,
        Color::TEXT,
    ));
    out.push(text(
        Vec2::new(size.x - 10.0, 30.0),
        format!("High Score: {}", state.high_score),
        24.0,
        Align::Right,
        Color::TEXT,
    ));

    match state.phase {
        GamePhase::Paused => push_overlay(
            &mut out,
            size,
            0.5,
            [
                ("Paused".to_string(), 48.0, -50.0),
                ("Press P to resume".to_string(), 24.0, 20.0),
            ],
        ),
        GamePhase::GameOver => {
            push_overlay(
                &mut out,
                size,
                0.7,
                [
                    ("Game Over".to_string(), 48.0, -50.0),
                    (format!("Final score: {}", state.score), 24.0, 0.0),
                ],
            );
            out.push(text(
                Vec2::new(size.x / 2.0, size.y / 2.0 + 50.0),
                "Click to play again",
                24.0,
                Align::Center,
                Color::WHITE,
            ));
        }
        GamePhase::Playing => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Container, MergeEffect};

    fn texts(scene: &[DrawCommand]) -> Vec<&str> {
        scene
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn dashed_lines(scene: &[DrawCommand]) -> usize {
        scene
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { dashed: true, .. }))
            .count()
    }

    #[test]
    fn test_color_css() {
        assert_eq!(Color::hex(0xFF3366).to_css(), "rgba(255, 51, 102, 1)");
        assert_eq!(Color::BLACK.with_alpha(0.5).to_css(), "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn test_playing_scene_shows_pending_piece_and_guide() {
        let state = GameState::new(1, Container::default());
        let scene = build_scene(&state, &Settings::default());
        let pending = state.pending.unwrap();

        assert!(matches!(scene[0], DrawCommand::Clear { .. }));
        assert!(scene.iter().any(|c| matches!(
            c,
            DrawCommand::Circle { center, fill: Some(fill), .. }
                if *center == pending.pos && *fill == Color::hex(pending.rank.info().color)
        )));
        assert_eq!(dashed_lines(&scene), 1);
        assert!(texts(&scene).contains(&"Score: 0"));
        assert!(!texts(&scene).contains(&"Paused"));
    }

    #[test]
    fn test_drop_guide_can_be_hidden() {
        let state = GameState::new(1, Container::default());
        let settings = Settings {
            show_drop_guide: false,
            ..Default::default()
        };
        assert_eq!(dashed_lines(&build_scene(&state, &settings)), 0);
    }

    #[test]
    fn test_paused_scene_hides_pending_piece() {
        let mut state = GameState::new(1, Container::default());
        state.toggle_pause();
        let scene = build_scene(&state, &Settings::default());
        assert_eq!(dashed_lines(&scene), 0);
        assert!(texts(&scene).contains(&"Paused"));
    }

    #[test]
    fn test_game_over_scene_shows_final_score() {
        let mut state = GameState::new(1, Container::default());
        state.score = 23;
        state.phase = GamePhase::GameOver;
        let scene = build_scene(&state, &Settings::default());
        let labels = texts(&scene);
        assert!(labels.contains(&"Game Over"));
        assert!(labels.contains(&"Final score: 23"));
        assert!(labels.contains(&"Click to play again"));
    }

    #[test]
    fn test_merge_effects_follow_setting() {
        let mut state = GameState::new(1, Container::default());
        state.effects.push(MergeEffect::new(Vec2::new(100.0, 300.0), Rank::SMALLEST));

        let ring = |scene: &[DrawCommand]| {
            scene.iter().any(|c| {
                matches!(c, DrawCommand::Circle { fill: None, stroke: Some((_, w)), .. } if *w == 4.0)
            })
        };
        assert!(ring(&build_scene(&state, &Settings::default())));

        let settings = Settings {
            show_merge_effects: false,
            ..Default::default()
        };
        assert!(!ring(&build_scene(&state, &settings)));
    }
}
