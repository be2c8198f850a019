use glam::{Vec2, Vec3};
use treeline_common::{ControllerConfig, Obstacle, ObstacleShape};

/// Horizontal distances below this are treated as "inside the axis".
const AXIS_EPSILON: f32 = 1e-6;

/// Output of one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub corrected_position: Vec3,
    pub on_ground: bool,
    /// Subtract from the body velocity. Only components along collision
    /// normals are present, so tangential motion survives.
    pub velocity_correction: Vec3,
    /// Obstacles that moved the body this pass.
    pub contacts: usize,
}

/// Stages of a resolution pass. Strictly sequential, never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePhase {
    Unresolved,
    GroundChecked,
    ObstacleChecked,
    Resolved,
}

/// Stateless resolver for one body shape.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    radius: f32,
    height: f32,
    ground_epsilon: f32,
}

impl CollisionResolver {
    pub fn new(radius: f32, height: f32, ground_epsilon: f32) -> Self {
        Self {
            radius,
            height,
            ground_epsilon,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(
            config.body_radius,
            config.body_height,
            config.ground_contact_epsilon,
        )
    }

    /// Horizontal reach to use for `TerrainQuery::obstacles_near`.
    pub fn query_radius(&self) -> f32 {
        self.radius + self.ground_epsilon
    }

    /// Resolve against level ground at `ground_height`.
    pub fn resolve(
        &self,
        candidate: Vec3,
        velocity: Vec3,
        ground_height: f32,
        obstacles: &[Obstacle],
    ) -> CollisionResult {
        self.resolve_on(candidate, velocity, |_, _| ground_height, obstacles)
    }

    /// Resolve a candidate position against the ground and the given
    /// obstacles, in order. `velocity` is the velocity that produced the
    /// candidate; `ground_at(x, z)` is sampled at the candidate column and
    /// again wherever the obstacle pushes left the body.
    pub fn resolve_on(
        &self,
        candidate: Vec3,
        velocity: Vec3,
        ground_at: impl Fn(f32, f32) -> f32,
        obstacles: &[Obstacle],
    ) -> CollisionResult {
        let mut pass = Resolution::begin(*self, candidate, velocity);
        pass.check_ground(ground_at(candidate.x, candidate.z));
        pass.check_obstacles(obstacles);
        let pushed = pass.position();
        pass.finish(ground_at(pushed.x, pushed.z))
    }
}

/// One in-flight resolution pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    resolver: CollisionResolver,
    phase: ResolvePhase,
    position: Vec3,
    velocity: Vec3,
    correction: Vec3,
    on_ground: bool,
    /// Ground contact came from the terrain rather than an obstacle top.
    on_terrain: bool,
    contacts: usize,
}

impl Resolution {
    pub fn begin(resolver: CollisionResolver, candidate: Vec3, velocity: Vec3) -> Self {
        Self {
            resolver,
            phase: ResolvePhase::Unresolved,
            position: candidate,
            velocity,
            correction: Vec3::ZERO,
            on_ground: false,
            on_terrain: false,
            contacts: 0,
        }
    }

    pub fn phase(&self) -> ResolvePhase {
        self.phase
    }

    /// Where the body stands so far in this pass.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Snap to the ground when within epsilon and not rising.
    pub fn check_ground(&mut self, ground_height: f32) {
        debug_assert_eq!(self.phase, ResolvePhase::Unresolved);
        let bottom = self.position.y;
        if bottom <= ground_height + self.resolver.ground_epsilon && self.velocity.y <= 0.0 {
            self.position.y = ground_height;
            self.remove_inward(Vec3::Y);
            self.on_ground = true;
            self.on_terrain = true;
        } else {
            self.on_ground = false;
            if bottom < ground_height {
                // Rising into a slope: lift out, stay airborne.
                self.position.y = ground_height;
            }
        }
        self.phase = ResolvePhase::GroundChecked;
    }

    /// Push out of each overlapping obstacle in order, one pass.
    pub fn check_obstacles(&mut self, obstacles: &[Obstacle]) {
        debug_assert_eq!(self.phase, ResolvePhase::GroundChecked);
        for obstacle in obstacles {
            let hit = match obstacle.shape {
                ObstacleShape::Cylinder { radius, height } => {
                    self.push_out_of_cylinder(obstacle.position, radius, height)
                }
                ObstacleShape::Box { half_extents } => {
                    self.push_out_of_box(obstacle.position, half_extents)
                }
            };
            if hit {
                self.contacts += 1;
            }
        }
        self.phase = ResolvePhase::ObstacleChecked;
    }

    /// Settle onto `ground_height`, the terrain under the body's final
    /// column, and close the pass.
    ///
    /// Obstacle pushes move the body sideways or down, so the feet are
    /// checked against the terrain once more. Terrain support found before
    /// the pushes follows the ground to the new column.
    pub fn finish(mut self, ground_height: f32) -> CollisionResult {
        debug_assert_eq!(self.phase, ResolvePhase::ObstacleChecked);
        let falling = self.velocity.y <= 0.0;
        let bottom = self.position.y;
        if bottom < ground_height {
            self.position.y = ground_height;
            if falling {
                self.remove_inward(Vec3::Y);
                self.on_ground = true;
                self.on_terrain = true;
            }
        } else if bottom <= ground_height + self.resolver.ground_epsilon
            && falling
            && (self.on_terrain || !self.on_ground)
        {
            self.position.y = ground_height;
            self.remove_inward(Vec3::Y);
            self.on_ground = true;
            self.on_terrain = true;
        } else if self.on_terrain {
            // Pushed off a ledge: terrain support is gone.
            self.on_terrain = false;
            self.on_ground = false;
        }
        self.phase = ResolvePhase::Resolved;
        tracing::trace!(
            phase = ?self.phase,
            contacts = self.contacts,
            on_ground = self.on_ground,
            "collision resolved"
        );
        CollisionResult {
            corrected_position: self.position,
            on_ground: self.on_ground,
            velocity_correction: self.correction,
            contacts: self.contacts,
        }
    }

    fn push_out_of_cylinder(&mut self, base: Vec3, radius: f32, height: f32) -> bool {
        if !self.spans_overlap(base.y, base.y + height) {
            return false;
        }
        let offset = Vec2::new(self.position.x - base.x, self.position.z - base.z);
        let min_dist = self.resolver.radius + radius;
        let dist_sq = offset.length_squared();
        if dist_sq >= min_dist * min_dist {
            return false;
        }
        let dist = dist_sq.sqrt();
        let normal = if dist > AXIS_EPSILON {
            offset / dist
        } else {
            // Dead center: back out the way we came.
            Vec2::new(-self.velocity.x, -self.velocity.z)
                .try_normalize()
                .unwrap_or(Vec2::X)
        };
        let depth = min_dist - dist;
        self.position.x += normal.x * depth;
        self.position.z += normal.y * depth;
        self.remove_inward(Vec3::new(normal.x, 0.0, normal.y));
        true
    }

    fn push_out_of_box(&mut self, center: Vec3, half: Vec3) -> bool {
        let r = self.resolver.radius;
        let half_height = self.resolver.height * 0.5;

        let dx = self.position.x - center.x;
        let dz = self.position.z - center.z;
        let overlap_x = r + half.x - dx.abs();
        let overlap_z = r + half.z - dz.abs();
        if overlap_x <= 0.0 || overlap_z <= 0.0 {
            return false;
        }

        // Standing on the lid counts as ground contact, same tolerance.
        let top = center.y + half.y;
        let gap = self.position.y - top;
        if (0.0..=self.resolver.ground_epsilon).contains(&gap) && self.velocity.y <= 0.0 {
            self.position.y = top;
            self.remove_inward(Vec3::Y);
            self.on_ground = true;
            self.on_terrain = false;
            return true;
        }

        let dy = self.position.y + half_height - center.y;
        let overlap_y = half_height + half.y - dy.abs();
        if overlap_y <= 0.0 {
            return false;
        }

        if overlap_y < overlap_x && overlap_y < overlap_z {
            if dy >= 0.0 {
                self.position.y += overlap_y;
                self.remove_inward(Vec3::Y);
                self.on_ground = true;
                self.on_terrain = false;
            } else {
                self.position.y -= overlap_y;
                self.remove_inward(Vec3::NEG_Y);
            }
        } else if overlap_x <= overlap_z {
            let sign = if dx >= 0.0 { 1.0 } else { -1.0 };
            self.position.x += sign * overlap_x;
            self.remove_inward(Vec3::X * sign);
        } else {
            let sign = if dz >= 0.0 { 1.0 } else { -1.0 };
            self.position.z += sign * overlap_z;
            self.remove_inward(Vec3::Z * sign);
        }
        true
    }

    /// Whether the body's vertical extent strictly overlaps `[bottom, top]`.
    fn spans_overlap(&self, bottom: f32, top: f32) -> bool {
        self.position.y < top && self.position.y + self.resolver.height > bottom
    }

    /// Drop the velocity component pointing against `normal`, if any.
    fn remove_inward(&mut self, normal: Vec3) {
        let into = self.velocity.dot(normal);
        if into < 0.0 {
            let c = normal * into;
            self.velocity -= c;
            self.correction += c;
        }
    }
}
