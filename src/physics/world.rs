//! Owned Rapier world. Blob bodies live here for the whole session; the ECS
//! only keeps handles and reads snapshots back out.
use bevy::prelude::*;
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    QueryPipeline, Real, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, Vector,
};

use crate::core::config::PhysicsConfig;

pub type BodyHandle = RigidBodyHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    /// Moved by explicit targets, pushes dynamic bodies, ignores forces.
    KinematicPosition,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub kind: BodyKind,
    pub shape: ColliderShape,
    pub translation: Vec3,
    pub rotation: Quat,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BodySpec {
    fn new(kind: BodyKind, shape: ColliderShape) -> Self {
        Self {
            kind,
            shape,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn dynamic(shape: ColliderShape) -> Self {
        Self::new(BodyKind::Dynamic, shape)
    }

    pub fn kinematic(shape: ColliderShape) -> Self {
        Self::new(BodyKind::KinematicPosition, shape)
    }

    pub fn fixed(shape: ColliderShape) -> Self {
        Self::new(BodyKind::Static, shape)
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestep {
    /// One solver step per frame with the capped frame delta.
    Variable,
    /// Capped frame time is accumulated and consumed in `dt` increments.
    Fixed { dt: f32, max_substeps: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    pub gravity: Vec3,
    pub max_delta: f32,
    pub timestep: Timestep,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self::from(&PhysicsConfig::default())
    }
}

impl From<&PhysicsConfig> for PhysicsSettings {
    fn from(cfg: &PhysicsConfig) -> Self {
        let timestep = match cfg.timestep.fixed_hz {
            Some(hz) if hz > 0.0 => Timestep::Fixed {
                dt: 1.0 / hz,
                max_substeps: cfg.timestep.max_substeps,
            },
            _ => Timestep::Variable,
        };
        Self {
            gravity: Vec3::from_array(cfg.gravity),
            max_delta: cfg.max_delta,
            timestep,
        }
    }
}

#[derive(Resource)]
pub struct PhysicsWorld {
    settings: PhysicsSettings,
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    query_pipeline: QueryPipeline,
    accumulator: f32,
    last_delta: f32,
    last_substeps: u32,
}

impl PhysicsWorld {
    pub fn new(settings: PhysicsSettings) -> Self {
        Self {
            settings,
            gravity: to_vector(settings.gravity),
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            accumulator: 0.0,
            last_delta: 0.0,
            last_substeps: 0,
        }
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn add_body(&mut self, spec: &BodySpec) -> BodyHandle {
        let (axis, angle) = spec.rotation.to_axis_angle();
        let builder = match spec.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::KinematicPosition => RigidBodyBuilder::kinematic_position_based(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        };
        let body = builder
            .translation(to_vector(spec.translation))
            .rotation(to_vector(axis * angle))
            .linear_damping(spec.linear_damping)
            .angular_damping(spec.angular_damping)
            .build();
        let handle = self.bodies.insert(body);

        let collider = match spec.shape {
            ColliderShape::Sphere { radius } => ColliderBuilder::ball(radius),
            ColliderShape::Cuboid { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
        }
        .restitution(spec.restitution)
        .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Clamp a frame delta to `[0, max_delta]`; NaN and negative inputs become 0.
    pub fn cap_delta(&self, delta: f32) -> f32 {
        if !delta.is_finite() || delta <= 0.0 {
            return 0.0;
        }
        delta.min(self.settings.max_delta).max(0.0)
    }

    /// Advance the simulation by one frame. Returns the capped delta.
    pub fn step(&mut self, delta: f32) -> f32 {
        let dt = self.cap_delta(delta);
        self.last_delta = dt;
        self.last_substeps = 0;
        if dt <= 0.0 {
            return 0.0;
        }
        match self.settings.timestep {
            Timestep::Variable => {
                self.step_once(dt);
                self.last_substeps = 1;
            }
            Timestep::Fixed { dt: fixed, max_substeps } => {
                self.accumulator += dt;
                while self.accumulator >= fixed && self.last_substeps < max_substeps {
                    self.step_once(fixed);
                    self.accumulator -= fixed;
                    self.last_substeps += 1;
                }
                // Drop the backlog rather than spiral when the substep cap is hit.
                self.accumulator = self.accumulator.min(fixed);
            }
        }
        dt
    }

    fn step_once(&mut self, dt: f32) {
        self.params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Capped delta of the most recent [`Self::step`] call.
    pub fn last_delta(&self) -> f32 {
        self.last_delta
    }

    pub fn last_substeps(&self) -> u32 {
        self.last_substeps
    }

    /// Impulse through the body centre. Returns false for unknown handles.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.apply_impulse(to_vector(impulse), true);
                true
            }
            None => false,
        }
    }

    /// Position the kinematic body will reach at the end of the next step.
    pub fn set_kinematic_target(&mut self, handle: BodyHandle, target: Vec3) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) if body.is_kinematic() => {
                body.set_next_kinematic_translation(to_vector(target));
                true
            }
            _ => false,
        }
    }

    pub fn translation(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|b| to_vec3(b.translation()))
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|b| to_vec3(b.linvel()))
    }

    pub fn transform(&self, handle: BodyHandle) -> Option<Transform> {
        self.bodies.get(handle).map(|b| {
            let q = b.rotation().coords;
            Transform {
                translation: to_vec3(b.translation()),
                rotation: Quat::from_xyzw(q.x, q.y, q.z, q.w),
                scale: Vec3::ONE,
            }
        })
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball() -> ColliderShape {
        ColliderShape::Sphere { radius: 0.1 }
    }

    #[test]
    fn huge_delta_is_capped() {
        let mut world = PhysicsWorld::new(PhysicsSettings::default());
        let h = world.add_body(&BodySpec::dynamic(ball()).with_translation(Vec3::Y * 2.0));
        let used = world.step(10.0);
        assert!((used - 0.1).abs() < 1e-6, "used {used}");
        assert_eq!(world.last_delta(), used);
        assert_eq!(world.last_substeps(), 1);
        // One 0.1 s step under g = 5 moves a resting body by at most g * dt^2.
        let y = world.translation(h).unwrap().y;
        assert!(y > 2.0 - 0.06 && y < 2.0, "y {y}");
    }

    #[test]
    fn non_positive_delta_does_not_step() {
        let mut world = PhysicsWorld::new(PhysicsSettings::default());
        let h = world.add_body(&BodySpec::dynamic(ball()).with_translation(Vec3::Y));
        assert_eq!(world.step(0.0), 0.0);
        assert_eq!(world.step(-1.0), 0.0);
        assert_eq!(world.step(f32::NAN), 0.0);
        assert_eq!(world.last_substeps(), 0);
        assert_eq!(world.translation(h), Some(Vec3::Y));
    }

    #[test]
    fn kinematic_body_reaches_target_exactly() {
        let mut world = PhysicsWorld::new(PhysicsSettings::default());
        let h = world.add_body(&BodySpec::kinematic(ColliderShape::Sphere { radius: 0.3 }));
        let target = Vec3::new(0.4, -0.25, 0.0);
        assert!(world.set_kinematic_target(h, target));
        world.step(1.0 / 60.0);
        assert_eq!(world.translation(h), Some(target));
        let next = Vec3::new(-1.0, 0.5, 0.0);
        world.set_kinematic_target(h, next);
        world.step(1.0 / 60.0);
        assert_eq!(world.translation(h), Some(next));
    }

    #[test]
    fn kinematic_target_rejected_for_dynamic_bodies() {
        let mut world = PhysicsWorld::new(PhysicsSettings::default());
        let h = world.add_body(&BodySpec::dynamic(ball()));
        assert!(!world.set_kinematic_target(h, Vec3::X));
    }

    #[test]
    fn static_body_ignores_gravity_and_impulses() {
        let mut world = PhysicsWorld::new(PhysicsSettings::default());
        let at = Vec3::new(0.0, -1.55, 0.0);
        let h = world.add_body(
            &BodySpec::fixed(ColliderShape::Cuboid {
                half_extents: Vec3::new(4.0, 1.0, 10.0),
            })
            .with_translation(at),
        );
        world.apply_impulse(h, Vec3::new(5.0, 5.0, 0.0));
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        assert_eq!(world.translation(h), Some(at));
    }

    #[test]
    fn gravity_pulls_dynamic_bodies_down() {
        let mut world = PhysicsWorld::new(PhysicsSettings::default());
        let h = world.add_body(&BodySpec::dynamic(ball()));
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        let p = world.translation(h).unwrap();
        assert!(p.y < -0.1, "p {p}");
        assert!(p.x.abs() < 1e-5 && p.z.abs() < 1e-5);
        assert!(world.linear_velocity(h).unwrap().y < 0.0);
    }

    #[test]
    fn damping_slows_descent() {
        let mut world = PhysicsWorld::new(PhysicsSettings::default());
        let free = world.add_body(&BodySpec::dynamic(ball()).with_translation(Vec3::NEG_X));
        let damped = world.add_body(
            &BodySpec::dynamic(ball())
                .with_translation(Vec3::new(1.0, 0.0, 0.0))
                .with_damping(4.0, 4.0),
        );
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        let yf = world.translation(free).unwrap().y;
        let yd = world.translation(damped).unwrap().y;
        assert!(yd > yf, "damped {yd} free {yf}");
    }

    #[test]
    fn impulse_changes_velocity() {
        let mut world = PhysicsWorld::new(PhysicsSettings {
            gravity: Vec3::ZERO,
            ..default()
        });
        let h = world.add_body(&BodySpec::dynamic(ball()));
        assert!(world.apply_impulse(h, Vec3::X * 0.01));
        world.step(1.0 / 60.0);
        assert!(world.linear_velocity(h).unwrap().x > 0.0);
        assert!(world.translation(h).unwrap().x > 0.0);
    }

    #[test]
    fn fixed_timestep_runs_bounded_substeps() {
        let mut world = PhysicsWorld::new(PhysicsSettings {
            timestep: Timestep::Fixed {
                dt: 1.0 / 60.0,
                max_substeps: 3,
            },
            ..default()
        });
        world.add_body(&BodySpec::dynamic(ball()));
        world.step(1.0 / 30.0 + 1e-4);
        assert_eq!(world.last_substeps(), 2);
        world.step(0.1);
        assert_eq!(world.last_substeps(), 3);
        world.step(1.0 / 240.0);
        assert!(world.last_substeps() <= 1);
    }

    #[test]
    fn settings_from_config() {
        let mut cfg = PhysicsConfig::default();
        assert_eq!(PhysicsSettings::from(&cfg).timestep, Timestep::Variable);
        cfg.timestep.fixed_hz = Some(50.0);
        cfg.timestep.max_substeps = 2;
        match PhysicsSettings::from(&cfg).timestep {
            Timestep::Fixed { dt, max_substeps } => {
                assert!((dt - 0.02).abs() < 1e-6);
                assert_eq!(max_substeps, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        cfg.timestep.fixed_hz = Some(0.0);
        assert_eq!(PhysicsSettings::from(&cfg).timestep, Timestep::Variable);
    }
}
