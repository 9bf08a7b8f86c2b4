//! Terrain model shared by the `hexpath` demo.
//!
//! Demonstrates: seeded terrain generation, implementing the path finder's
//! collaborator traits for a game world, running a search on a worker
//! thread, and drawing the result on an ASCII hex map.

use std::fmt::Write as _;

use hexnav_core::{HexGrid, HexPoint, Vec3};
use hexnav_paths::{GroundQuery, MoveReport, MovementValidator, PathResult, PathStatus};
use rand::{RngExt, SeedableRng};

pub const EXTENT: f32 = 24.0;
const HILL_AMPLITUDE: f32 = 1.2;
const HILL_FREQUENCY: f32 = 0.18;
const MARSH_SPEED: f32 = 0.4;

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// The moving object: a round body that can climb up to `max_slope`.
#[derive(Clone, Debug)]
pub struct Walker {
    pub radius: f32,
    pub max_slope: f32,
    pub facing: Vec3,
    pub has_key: bool,
}

impl Default for Walker {
    fn default() -> Self {
        Self {
            radius: 0.3,
            max_slope: 0.8,
            facing: Vec3::new(0.0, 0.0, 1.0),
            has_key: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneKind {
    /// Slows the walker down.
    Marsh,
    /// Only walkers with a key may cross.
    LockedGate,
}

#[derive(Clone, Debug)]
pub struct Zone {
    pub kind: ZoneKind,
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Clone, Debug)]
pub struct Rock {
    pub center: Vec3,
    pub radius: f32,
}

/// Which zone a move crossed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneId(pub usize);

/// Which rock a move hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RockId(pub usize);

/// Square patch of rolling ground with rocks and trigger zones.
pub struct Terrain {
    pub grid: HexGrid,
    pub extent: f32,
    pub hills: bool,
    pub rocks: Vec<Rock>,
    pub zones: Vec<Zone>,
}

impl Terrain {
    /// Flat, empty ground for `|x| <= extent` and `|z| <= extent`.
    pub fn flat(extent: f32) -> Self {
        Self {
            grid: HexGrid::default(),
            extent,
            hills: false,
            rocks: Vec::new(),
            zones: Vec::new(),
        }
    }

    /// Hilly ground scattered with rocks and marshes. Nothing is placed
    /// within `keep_clear` of any point in `clear`.
    pub fn generate(seed: u64, rock_count: usize, clear: &[Vec3], keep_clear: f32) -> Self {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut terrain = Self::flat(EXTENT);
        terrain.hills = true;

        let margin = EXTENT - 2.0;
        let mut attempts = 0;
        while terrain.rocks.len() < rock_count && attempts < rock_count * 20 {
            attempts += 1;
            let center = Vec3::new(
                rng.random_range(-margin..margin),
                0.0,
                rng.random_range(-margin..margin),
            );
            let radius = rng.random_range(0.6..2.2);
            if clear
                .iter()
                .any(|p| p.distance_xz(center) < keep_clear + radius)
            {
                continue;
            }
            terrain.rocks.push(Rock { center, radius });
        }

        for _ in 0..rock_count / 4 {
            let center = Vec3::new(
                rng.random_range(-margin..margin),
                0.0,
                rng.random_range(-margin..margin),
            );
            terrain.zones.push(Zone {
                kind: ZoneKind::Marsh,
                center,
                radius: rng.random_range(1.5..3.5),
            });
        }
        terrain
    }

    pub fn with_rock(mut self, x: f32, z: f32, radius: f32) -> Self {
        self.rocks.push(Rock {
            center: Vec3::new(x, 0.0, z),
            radius,
        });
        self
    }

    pub fn with_zone(mut self, kind: ZoneKind, x: f32, z: f32, radius: f32) -> Self {
        self.zones.push(Zone {
            kind,
            center: Vec3::new(x, 0.0, z),
            radius,
        });
        self
    }

    /// Cell center of `p` lifted onto the ground, if there is ground.
    pub fn ground_point(&self, p: HexPoint) -> Option<Vec3> {
        let v = self.grid.to_world(p);
        self.height_at(v.x, v.z).map(|y| v.with_y(y))
    }

    fn rock_at(&self, p: Vec3) -> bool {
        self.rocks
            .iter()
            .any(|r| r.center.distance_xz(p) < r.radius)
    }

    fn zone_at(&self, p: Vec3) -> Option<ZoneKind> {
        self.zones
            .iter()
            .find(|z| z.center.distance_xz(p) < z.radius)
            .map(|z| z.kind)
    }
}

impl GroundQuery for Terrain {
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if x.abs() > self.extent || z.abs() > self.extent {
            return None;
        }
        if !self.hills {
            return Some(0.0);
        }
        Some(HILL_AMPLITUDE * (x * HILL_FREQUENCY).sin() * (z * HILL_FREQUENCY).cos())
    }
}

impl MovementValidator for Terrain {
    type Object = Walker;
    type Trigger = ZoneId;
    type Collider = RockId;

    fn can_move(
        &self,
        walker: &Walker,
        from: Vec3,
        to: Vec3,
        report: &mut MoveReport<ZoneId, RockId>,
    ) -> PathStatus {
        report.squared_length = (to - from).squared_length();
        report.height_diff = to.y - from.y;

        let run = from.distance_xz(to);
        if run > 0.0 && report.height_diff.abs() / run > walker.max_slope {
            return PathStatus::TOO_STEEP;
        }

        for (i, rock) in self.rocks.iter().enumerate() {
            if rock.center.segment_distance_xz(from, to) < rock.radius + walker.radius {
                report.collider = Some(RockId(i));
                return PathStatus::OBJECT_COLLISION;
            }
        }

        let mut status = PathStatus::CAN_MOVE;
        for (i, zone) in self.zones.iter().enumerate() {
            if zone.center.segment_distance_xz(from, to) >= zone.radius {
                continue;
            }
            match zone.kind {
                ZoneKind::Marsh => report.speed_modifier *= MARSH_SPEED,
                ZoneKind::LockedGate if !walker.has_key => return PathStatus::TRIGGER_NO_ACCESS,
                ZoneKind::LockedGate => {}
            }
            report.record_trigger(ZoneId(i));
            status = PathStatus::NEED_RUN_TRIGGERS;
        }
        status
    }

    fn heading(&self, walker: &Walker) -> Option<Vec3> {
        Some(walker.facing)
    }
}

// ---------------------------------------------------------------------------
// ASCII map
// ---------------------------------------------------------------------------

/// Draw the terrain and a path, one character per cell, north at the top.
///
/// `S` start, `D` destination, `o` waypoints, `*` cells along the path,
/// `#` rocks, `~` marsh, `X` locked gates, `.` open ground.
pub fn render(terrain: &Terrain, result: &PathResult, src: Vec3, dst: Vec3) -> String {
    let grid = &terrain.grid;
    let max_a = (terrain.extent / grid.column_spacing()).floor() as i32;
    let max_b = (terrain.extent / grid.cell_size()).floor() as i32;

    let mut on_path = Vec::new();
    for pair in result.points.windows(2) {
        let steps = (pair[0].distance_xz(pair[1]) / (grid.cell_size() * 0.25)).ceil() as usize;
        for i in 0..=steps.max(1) {
            let t = i as f32 / steps.max(1) as f32;
            on_path.push(grid.from_world(pair[0] + (pair[1] - pair[0]) * t));
        }
    }
    let waypoints: Vec<HexPoint> = result.points.iter().map(|p| grid.from_world(*p)).collect();
    let start = grid.from_world(src);
    let goal = grid.from_world(dst);

    let mut out = String::new();
    for b in (-max_b..=max_b).rev() {
        for a in -max_a..=max_a {
            let p = HexPoint::new(a, b);
            let center = grid.to_world(p);
            let ch = if p == start {
                'S'
            } else if p == goal {
                'D'
            } else if waypoints.contains(&p) {
                'o'
            } else if on_path.contains(&p) {
                '*'
            } else if terrain.rock_at(center) {
                '#'
            } else {
                match terrain.zone_at(center) {
                    Some(ZoneKind::Marsh) => '~',
                    Some(ZoneKind::LockedGate) => 'X',
                    None => '.',
                }
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

/// One line per waypoint with the cost of the segment leading to it.
pub fn describe(result: &PathResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "status {} after {} iterations",
        result.status, result.iterations
    );
    for (i, p) in result.points.iter().enumerate() {
        match i.checked_sub(1).and_then(|j| result.segment_costs.get(j)) {
            Some(cost) => {
                let _ = writeln!(out, "  {i:>2}: {p}  (+{cost:.2})");
            }
            None => {
                let _ = writeln!(out, "  {i:>2}: {p}");
            }
        }
    }
    if result.is_ok() {
        let _ = writeln!(out, "total cost {:.2}", result.total_cost());
    }
    out
}
