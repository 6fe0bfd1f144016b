//! Abstract 2D drawing surface used by every `draw` routine.
//!
//! Coordinates follow canvas conventions: origin at the top-left of the
//! viewport, +X right, +Y down, angles clockwise on screen.  Drawing calls take
//! local coordinates; the surface maps them through its [`TransformStack`]
//! (save / translate / rotate / restore) before rasterising.
//!
//! [`RecordingSurface`] is the headless implementation and records
//! screen-space [`DrawCommand`]s.  `plugin::GizmoSurface` draws through Bevy
//! gizmos in the window.

use bevy::color::Color;
use bevy::math::{Affine2, Vec2};

/// Fill style for circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Color),
    /// Radial gradient from `inner` at the centre to `outer` at the rim.
    RadialGradient { inner: Color, outer: Color },
}

/// Save/restore stack of local→screen transforms.
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: Affine2,
    saved: Vec<Affine2>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            current: Affine2::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl TransformStack {
    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Pop the last saved transform.  Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.current = previous;
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.current = self.current * Affine2::from_translation(offset);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.current = self.current * Affine2::from_angle(angle);
    }

    /// Map a local point to screen space.
    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        self.current.transform_point2(p)
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

/// Drawing primitives a renderer must provide.
///
/// Implementors only supply rasterisation plus access to their
/// [`TransformStack`]; the transform operations have default bodies.
pub trait DrawSurface {
    /// Visible size in screen pixels.
    fn viewport(&self) -> Vec2;

    fn transforms(&mut self) -> &mut TransformStack;

    fn save(&mut self) {
        self.transforms().save();
    }

    fn restore(&mut self) {
        self.transforms().restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.transforms().translate(offset);
    }

    fn rotate(&mut self, angle: f32) {
        self.transforms().rotate(angle);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: Fill);

    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: Color);

    fn fill_path(&mut self, points: &[Vec2], color: Color);
}

/// A primitive as it landed on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        origin: Vec2,
        size: Vec2,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Fill,
    },
    Stroke {
        points: Vec<Vec2>,
        closed: bool,
        color: Color,
    },
    FillPath {
        points: Vec<Vec2>,
        color: Color,
    },
}

/// Headless surface that keeps every primitive in screen space.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    viewport: Vec2,
    stack: TransformStack,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            stack: TransformStack::default(),
            commands: Vec::new(),
        }
    }

    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32, Fill)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle {
                center,
                radius,
                fill,
            } => Some((*center, *radius, *fill)),
            _ => None,
        })
    }

    pub fn strokes(&self) -> impl Iterator<Item = &[Vec2]> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Stroke { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    /// Depth of the transform stack; zero after a balanced frame.
    pub fn open_saves(&self) -> usize {
        self.stack.depth()
    }
}

impl DrawSurface for RecordingSurface {
    fn viewport(&self) -> Vec2 {
        self.viewport
    }

    fn transforms(&mut self) -> &mut TransformStack {
        &mut self.stack
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        let origin = self.stack.apply(origin);
        self.commands.push(DrawCommand::Rect {
            origin,
            size,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: Fill) {
        let center = self.stack.apply(center);
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
        });
    }

    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: Color) {
        let points = points.iter().map(|p| self.stack.apply(*p)).collect();
        self.commands.push(DrawCommand::Stroke {
            points,
            closed,
            color,
        });
    }

    fn fill_path(&mut self, points: &[Vec2], color: Color) {
        let points = points.iter().map(|p| self.stack.apply(*p)).collect();
        self.commands.push(DrawCommand::FillPath { points, color });
    }
}
