//! Square patch of ground with circular rocks and speed zones, for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use hexnav_core::{HexGrid, HexPoint, Vec3};

use crate::{GroundQuery, MoveReport, MovementValidator, PathStatus};

#[derive(Clone, Debug, Default)]
pub(crate) struct Mover {
    pub heading: Option<Vec3>,
}

struct Circle {
    center: Vec3,
    radius: f32,
}

impl Circle {
    fn touches(&self, from: Vec3, to: Vec3) -> bool {
        self.center.segment_distance_xz(from, to) < self.radius
    }
}

pub(crate) struct TestWorld {
    grid: HexGrid,
    bounds: f32,
    slope: f32,
    rocks: Vec<Circle>,
    zones: Vec<(Circle, f32)>,
    blocked: Vec<HexPoint>,
    forbidden: Vec<(HexPoint, HexPoint)>,
    checks: AtomicUsize,
}

impl TestWorld {
    /// Flat ground for `|x| <= bounds` and `|z| <= bounds`.
    pub fn open(bounds: f32) -> Self {
        Self {
            grid: HexGrid::default(),
            bounds,
            slope: 0.0,
            rocks: Vec::new(),
            zones: Vec::new(),
            blocked: Vec::new(),
            forbidden: Vec::new(),
            checks: AtomicUsize::new(0),
        }
    }

    pub fn bounds(&self) -> f32 {
        self.bounds
    }

    /// Ground rising along +Z by `slope` per unit.
    pub fn with_slope(mut self, slope: f32) -> Self {
        self.slope = slope;
        self
    }

    pub fn with_rock(mut self, x: f32, z: f32, radius: f32) -> Self {
        self.rocks.push(Circle {
            center: Vec3::new(x, 0.0, z),
            radius,
        });
        self
    }

    /// Trigger zone scaling speed by `speed`; zero denies access.
    pub fn with_zone(mut self, x: f32, z: f32, radius: f32, speed: f32) -> Self {
        self.zones.push((
            Circle {
                center: Vec3::new(x, 0.0, z),
                radius,
            },
            speed,
        ));
        self
    }

    /// Moves ending in cell `p` collide.
    pub fn block_cell(mut self, p: HexPoint) -> Self {
        self.blocked.push(p);
        self
    }

    /// Moves from cell `from` into cell `to` collide.
    pub fn forbid_edge(mut self, from: HexPoint, to: HexPoint) -> Self {
        self.forbidden.push((from, to));
        self
    }

    /// Number of `can_move` calls so far.
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::Relaxed)
    }
}

impl GroundQuery for TestWorld {
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        (x.abs() <= self.bounds && z.abs() <= self.bounds).then(|| z * self.slope)
    }
}

impl MovementValidator for TestWorld {
    type Object = Mover;
    type Trigger = usize;
    type Collider = usize;

    fn can_move(
        &self,
        _object: &Mover,
        from: Vec3,
        to: Vec3,
        report: &mut MoveReport<usize, usize>,
    ) -> PathStatus {
        self.checks.fetch_add(1, Ordering::Relaxed);
        report.squared_length = (to - from).squared_length();
        report.height_diff = to.y - from.y;

        let from_cell = self.grid.from_world(from);
        let to_cell = self.grid.from_world(to);
        if self.blocked.contains(&to_cell) {
            return PathStatus::WORLD_OBJECT_COLLISION;
        }
        if self.forbidden.contains(&(from_cell, to_cell)) {
            return PathStatus::ACTOR_COLLISION;
        }
        if let Some(i) = self.rocks.iter().position(|r| r.touches(from, to)) {
            report.collider = Some(i);
            return PathStatus::OBJECT_COLLISION;
        }
        for (i, (zone, speed)) in self.zones.iter().enumerate() {
            if zone.touches(from, to) {
                if *speed <= 0.0 {
                    return PathStatus::TRIGGER_NO_ACCESS;
                }
                report.speed_modifier *= speed;
                report.record_trigger(i);
            }
        }
        PathStatus::CAN_MOVE
    }

    fn heading(&self, object: &Mover) -> Option<Vec3> {
        object.heading
    }
}
