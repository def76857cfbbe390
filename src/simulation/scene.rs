//! Scene membership and renderable descriptions.
//!
//! The animator never draws anything. It adds [`Visual`]s to a [`Scene`],
//! mutates them through their [`VisualId`] and removes them again; the
//! viewer (or a test) reads the scene afterwards.

use std::collections::BTreeMap;

use crate::simulation::states::NVec3;

/// Opaque handle to a visual inside a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisualId(pub u64);

/// Linear RGB color, components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const PROTON: Rgb = Rgb(0.95, 0.25, 0.2);
    pub const NEUTRON: Rgb = Rgb(0.35, 0.55, 0.95);
    pub const TARGET: Rgb = Rgb(0.85, 0.65, 0.2);
    pub const GAMMA: Rgb = Rgb(0.4, 1.0, 0.4);
    pub const FLASH: Rgb = Rgb(1.0, 0.9, 0.5);
    pub const WAVE: Rgb = Rgb(0.3, 0.8, 1.0);
    pub const COMPOUND: Rgb = Rgb(1.0, 0.45, 0.1);
    pub const EXCITED: Rgb = Rgb(0.8, 0.3, 1.0);
}

/// Geometry of one part of a visual, in the visual's local frame
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere { radius: f64 },
    Ring { inner: f64, outer: f64 }, // flat annulus in the XY plane
    Line { points: Vec<NVec3> }, // polyline
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub shape: Shape,
    pub offset: NVec3, // relative to the visual position
    pub color: Rgb,
    pub scale: f64,
    pub opacity: f64,
}

impl Part {
    pub fn new(shape: Shape, color: Rgb) -> Self {
        Self {
            shape,
            offset: NVec3::zeros(),
            color,
            scale: 1.0,
            opacity: 1.0,
        }
    }

    pub fn at(mut self, offset: NVec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// A renderable scene object (a group of parts sharing one transform)
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub position: NVec3,
    pub scale: f64,
    pub opacity: f64,
    pub visible: bool,
    pub parts: Vec<Part>,
}

impl Visual {
    pub fn new(position: NVec3, parts: Vec<Part>) -> Self {
        Self {
            position,
            scale: 1.0,
            opacity: 1.0,
            visible: true,
            parts,
        }
    }
}

/// Scene membership as seen by the animator
///
/// `remove` must tolerate ids that are already gone.
pub trait Scene {
    fn add(&mut self, visual: Visual) -> VisualId;
    fn remove(&mut self, id: VisualId);
    fn get(&self, id: VisualId) -> Option<&Visual>;
    fn get_mut(&mut self, id: VisualId) -> Option<&mut Visual>;

    fn contains(&self, id: VisualId) -> bool {
        self.get(id).is_some()
    }
}

/// In-memory scene keyed by insertion order
#[derive(Debug, Default)]
pub struct MemoryScene {
    next_id: u64,
    visuals: BTreeMap<VisualId, Visual>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = VisualId> + '_ {
        self.visuals.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VisualId, &Visual)> + '_ {
        self.visuals.iter().map(|(id, v)| (*id, v))
    }
}

impl Scene for MemoryScene {
    fn add(&mut self, visual: Visual) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        self.visuals.insert(id, visual);
        id
    }

    fn remove(&mut self, id: VisualId) {
        self.visuals.remove(&id);
    }

    fn get(&self, id: VisualId) -> Option<&Visual> {
        self.visuals.get(&id)
    }

    fn get_mut(&mut self, id: VisualId) -> Option<&mut Visual> {
        self.visuals.get_mut(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot() -> Visual {
        Visual::new(NVec3::zeros(), vec![Part::new(Shape::Sphere { radius: 0.1 }, Rgb::WHITE)])
    }

    #[test]
    fn ids_are_never_reused() {
        let mut scene = MemoryScene::new();
        let a = scene.add(dot());
        scene.remove(a);
        let b = scene.add(dot());
        assert_ne!(a, b);
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
    }

    #[test]
    fn double_remove_is_harmless() {
        let mut scene = MemoryScene::new();
        let a = scene.add(dot());
        let b = scene.add(dot());
        scene.remove(a);
        scene.remove(a);
        assert_eq!(scene.len(), 1);
        assert!(scene.contains(b));
    }
}
