use doodlepix::brush::{BrushSettings, BrushTexture};
use doodlepix::canvas::{Canvas, PixelPatch};
use doodlepix::command::{Command, CommandContext, CommandHistory};
use doodlepix::error::{HistoryDirection, HistoryError};
use doodlepix::event::{EventBus, EventRecorder, SessionEvent};
use doodlepix::stroke::{Shape, Stroke, StrokeMode};
use egui::{Color32, Pos2};
use image::{Rgba, RgbaImage};

fn stroke(mode: StrokeMode, color: Color32, points: &[(f32, f32)]) -> Command {
    Command::Stroke(Stroke::new(
        mode,
        color,
        BrushSettings::default(),
        points.iter().map(|&(x, y)| Pos2::new(x, y)).collect(),
    ))
}

fn triangle(color: Color32) -> Command {
    let points = vec![Pos2::new(10.0, 10.0), Pos2::new(40.0, 12.0), Pos2::new(20.0, 30.0)];
    Command::Shape(Shape::from_lasso(points, color, 64, 64).unwrap())
}

fn edits() -> Vec<Command> {
    vec![
        stroke(StrokeMode::Draw, Color32::WHITE, &[(5.0, 5.0), (30.0, 30.0)]),
        triangle(Color32::RED),
        stroke(StrokeMode::Erase, Color32::WHITE, &[(20.0, 5.0), (20.0, 50.0)]),
        Command::Clear,
        stroke(StrokeMode::Draw, Color32::GREEN, &[(50.0, 50.0), (60.0, 10.0), (2.0, 60.0)]),
    ]
}

#[test]
fn test_undo_redo_round_trip() {
    let mut canvas = Canvas::new(64, 64, Color32::BLACK);
    let bus = EventBus::new();
    let mut history = CommandHistory::new();

    let mut states: Vec<RgbaImage> = vec![canvas.pixels().clone()];
    for command in edits() {
        let mut ctx = CommandContext::new(&mut canvas, &bus);
        history.record(command, &mut ctx);
        states.push(canvas.pixels().clone());
    }

    // Undo everything, checking each intermediate state
    for expected in states.iter().rev().skip(1) {
        let mut ctx = CommandContext::new(&mut canvas, &bus);
        history.undo(&mut ctx).unwrap();
        assert_eq!(canvas.pixels(), expected);
    }
    assert!(canvas.is_blank());
    assert!(!history.can_undo());

    // Redo everything
    for expected in states.iter().skip(1) {
        let mut ctx = CommandContext::new(&mut canvas, &bus);
        history.redo(&mut ctx).unwrap();
        assert_eq!(canvas.pixels(), expected);
    }
    assert!(!history.can_redo());
}

#[test]
fn test_new_edit_discards_redo() {
    let mut canvas = Canvas::new(64, 64, Color32::BLACK);
    let bus = EventBus::new();
    let mut history = CommandHistory::new();
    let mut ctx = CommandContext::new(&mut canvas, &bus);

    for command in edits().into_iter().take(3) {
        history.record(command, &mut ctx);
    }
    history.undo(&mut ctx).unwrap();
    history.undo(&mut ctx).unwrap();
    assert_eq!(history.redo_len(), 2);

    history.record(triangle(Color32::BLUE), &mut ctx);
    assert_eq!(history.redo_len(), 0);
    assert_eq!(history.undo_len(), 2);
    assert_eq!(
        history.redo(&mut ctx),
        Err(HistoryError::EmptyHistory(HistoryDirection::Redo))
    );
}

#[test]
fn test_erase_renders_background() {
    let mut canvas = Canvas::new(32, 32, Color32::BLACK);
    let bus = EventBus::new();
    let mut history = CommandHistory::new();
    let mut ctx = CommandContext::new(&mut canvas, &bus);

    let path = [(4.0, 16.0), (28.0, 16.0)];
    history.record(stroke(StrokeMode::Draw, Color32::WHITE, &path), &mut ctx);
    assert_eq!(ctx.canvas.pixel(16, 16), Some(Color32::WHITE));

    // The eraser's own color is irrelevant
    history.record(stroke(StrokeMode::Erase, Color32::RED, &path), &mut ctx);
    assert!(ctx.canvas.is_blank());
}

#[test]
fn test_changes_are_announced_with_region() {
    let mut canvas = Canvas::new(64, 64, Color32::BLACK);
    let bus = EventBus::new();
    let recorder = EventRecorder::new();
    bus.subscribe(Box::new(recorder.clone()));
    let mut history = CommandHistory::new();
    let mut ctx = CommandContext::new(&mut canvas, &bus);

    let region = history.record(triangle(Color32::RED), &mut ctx);
    assert!(region.is_square());
    assert_eq!(
        recorder.drain(),
        vec![
            SessionEvent::CanvasChanged { region },
            SessionEvent::HistoryChanged {
                can_undo: true,
                can_redo: false,
            },
        ]
    );

    let undone = history.undo(&mut ctx).unwrap();
    assert_eq!(undone, region);
    assert_eq!(
        recorder.drain(),
        vec![
            SessionEvent::CanvasChanged { region },
            SessionEvent::HistoryChanged {
                can_undo: false,
                can_redo: true,
            },
        ]
    );
}

#[test]
fn test_undo_only_touches_the_command_region() {
    let mut canvas = Canvas::new(64, 64, Color32::BLACK);
    let bus = EventBus::new();
    let mut history = CommandHistory::new();
    let mut ctx = CommandContext::new(&mut canvas, &bus);

    history.record(stroke(StrokeMode::Draw, Color32::WHITE, &[(5.0, 5.0)]), &mut ctx);
    let region = history.record(stroke(StrokeMode::Draw, Color32::WHITE, &[(50.0, 50.0)]), &mut ctx);
    history.undo(&mut ctx).unwrap();

    assert!(!region.contains(5, 5));
    assert_eq!(ctx.canvas.pixel(5, 5), Some(Color32::WHITE));
    assert_eq!(ctx.canvas.pixel(50, 50), Some(Color32::BLACK));
}

/// Deterministic xorshift source for generated edit sequences
struct Sequence(u64);

impl Sequence {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1)
    }

    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        let unit = (self.next() >> 40) as f32 / (1u64 << 24) as f32;
        lo + unit * (hi - lo)
    }

    /// Points may land off a 64x64 canvas
    fn point(&mut self) -> Pos2 {
        Pos2::new(self.range(-20.0, 84.0), self.range(-20.0, 84.0))
    }

    fn color(&mut self) -> Color32 {
        let [r, g, b, a] = (self.next() as u32).to_le_bytes();
        Color32::from_rgba_unmultiplied(r, g, b, a.max(32))
    }

    fn command(&mut self) -> Option<Command> {
        match self.below(6) {
            0 | 1 => {
                let mode = if self.below(3) == 0 { StrokeMode::Erase } else { StrokeMode::Draw };
                let brush = BrushSettings::new(
                    BrushTexture::ALL[self.below(4) as usize],
                    self.range(1.0, 40.0),
                    self.range(0.0, 1.0),
                    self.range(0.1, 1.0),
                );
                let points = (0..1 + self.below(6)).map(|_| self.point()).collect();
                Some(Command::Stroke(Stroke::new(mode, self.color(), brush, points)))
            }
            2 => {
                let points = (0..3 + self.below(5)).map(|_| self.point()).collect();
                let color = self.color();
                Shape::from_lasso(points, color, 64, 64).map(Command::Shape)
            }
            3 => {
                // Recorded against a larger canvas, so its region reaches past this one
                let points = (0..3 + self.below(5))
                    .map(|_| Pos2::new(self.range(30.0, 128.0), self.range(30.0, 128.0)))
                    .collect();
                let color = self.color();
                Shape::from_lasso(points, color, 128, 128).map(Command::Shape)
            }
            4 => {
                let side = 1 + self.below(90) as u32;
                let mut image = RgbaImage::new(side, side);
                for pixel in image.pixels_mut() {
                    *pixel = Rgba(self.color().to_srgba_unmultiplied());
                }
                Some(Command::Restore(PixelPatch::from_image(&image)))
            }
            _ => Some(Command::Clear),
        }
    }
}

#[test]
fn test_generated_sequences_round_trip() {
    for seed in 0..40 {
        let mut source = Sequence::new(seed);
        let background = if seed % 2 == 0 { Color32::BLACK } else { Color32::from_gray(90) };
        let mut canvas = Canvas::new(64, 64, background);
        let bus = EventBus::new();
        let mut history = CommandHistory::new();

        let mut states: Vec<RgbaImage> = vec![canvas.pixels().clone()];
        let length = 4 + source.below(12);
        while (states.len() as u64) <= length {
            let Some(command) = source.command() else {
                continue;
            };
            if command.is_degenerate(&canvas) {
                continue;
            }
            let mut ctx = CommandContext::new(&mut canvas, &bus);
            history.record(command, &mut ctx);
            states.push(canvas.pixels().clone());
        }

        for (step, expected) in states.iter().rev().skip(1).enumerate() {
            let mut ctx = CommandContext::new(&mut canvas, &bus);
            history.undo(&mut ctx).unwrap();
            assert_eq!(canvas.pixels(), expected, "seed {seed}, undo step {step}");
        }
        assert!(canvas.is_blank(), "seed {seed}");

        for (step, expected) in states.iter().skip(1).enumerate() {
            let mut ctx = CommandContext::new(&mut canvas, &bus);
            history.redo(&mut ctx).unwrap();
            assert_eq!(canvas.pixels(), expected, "seed {seed}, redo step {step}");
        }
    }
}

#[test]
fn test_shape_reaching_past_canvas_is_undoable() {
    let mut canvas = Canvas::new(64, 64, Color32::BLACK);
    let bus = EventBus::new();
    let mut history = CommandHistory::new();
    let mut ctx = CommandContext::new(&mut canvas, &bus);

    let points = vec![Pos2::new(40.0, 40.0), Pos2::new(120.0, 44.0), Pos2::new(50.0, 110.0)];
    let shape = Shape::from_lasso(points, Color32::RED, 128, 128).unwrap();
    assert!(shape.region().right() > 64);

    let command = Command::Shape(shape);
    assert!(!command.is_degenerate(ctx.canvas));
    let region = history.record(command, &mut ctx);
    assert!(!region.is_empty());
    assert_eq!(ctx.canvas.pixel(50, 50), Some(Color32::RED));

    let undone = history.undo(&mut ctx).unwrap();
    assert_eq!(undone, region);
    assert!(ctx.canvas.is_blank());
}
