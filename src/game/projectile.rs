//! Projectile ownership and lifetime-based disposal

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Handle to a projectile owned by a [`ProjectileArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    /// Fired by the player this shot
    Real,
    /// Replay of the previous shot
    Ghost,
}

/// A projectile handed to the physics collaborator
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub kind: ProjectileKind,
    pub position: Vec3,
    pub velocity: Vec2,
    /// Idle ghost placeholders do not collide
    pub collidable: bool,
    /// `None` while disposal is deferred (idle placeholder)
    pub lifetime_remaining: Option<f32>,
}

impl Projectile {
    /// Live and moving: counts toward the in-flight gate
    pub fn is_active(&self) -> bool {
        self.lifetime_remaining.is_some()
    }
}

/// Owns every projectile in the level, addressed by handle
#[derive(Debug, Default)]
pub struct ProjectileArena {
    projectiles: Vec<Projectile>,
    next_id: u64,
}

impl ProjectileArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a moving, colliding projectile that expires after `lifetime`
    pub fn spawn_active(
        &mut self,
        kind: ProjectileKind,
        position: Vec3,
        velocity: Vec2,
        lifetime: f32,
    ) -> ProjectileId {
        self.push(Projectile {
            id: ProjectileId(0),
            kind,
            position,
            velocity,
            collidable: true,
            lifetime_remaining: Some(lifetime),
        })
    }

    /// Spawn a resting ghost placeholder with no lifetime
    pub fn spawn_idle_ghost(&mut self, position: Vec3) -> ProjectileId {
        self.push(Projectile {
            id: ProjectileId(0),
            kind: ProjectileKind::Ghost,
            position,
            velocity: Vec2::ZERO,
            collidable: false,
            lifetime_remaining: None,
        })
    }

    fn push(&mut self, mut projectile: Projectile) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        projectile.id = id;
        self.projectiles.push(projectile);
        id
    }

    /// Launch an idle placeholder. Returns false if the handle is gone.
    pub fn activate(&mut self, id: ProjectileId, velocity: Vec2, lifetime: f32) -> bool {
        match self.get_mut(id) {
            Some(projectile) => {
                projectile.velocity = velocity;
                projectile.collidable = true;
                projectile.lifetime_remaining = Some(lifetime);
                true
            }
            None => false,
        }
    }

    pub fn dispose(&mut self, id: ProjectileId) -> Option<Projectile> {
        let idx = self.projectiles.iter().position(|p| p.id == id)?;
        Some(self.projectiles.remove(idx))
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.projectiles.iter_mut().find(|p| p.id == id)
    }

    /// Age active projectiles and dispose the expired ones.
    /// Expiry does not depend on collisions or on the projectile settling.
    pub fn tick(&mut self, dt: f32) -> Vec<ProjectileId> {
        let mut expired = Vec::new();
        for projectile in self.projectiles.iter_mut() {
            if let Some(remaining) = projectile.lifetime_remaining.as_mut() {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    expired.push(projectile.id);
                }
            }
        }
        self.projectiles
            .retain(|p| p.lifetime_remaining.map_or(true, |remaining| remaining > 0.0));
        expired
    }

    /// Number of projectiles currently in flight
    pub fn in_flight(&self) -> usize {
        self.projectiles.iter().filter(|p| p.is_active()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_projectiles_expire_regardless_of_state() {
        let mut arena = ProjectileArena::new();
        let real = arena.spawn_active(ProjectileKind::Real, Vec3::ZERO, Vec2::X, 1.0);
        let idle = arena.spawn_idle_ghost(Vec3::ZERO);
        assert_eq!(arena.in_flight(), 1);

        assert!(arena.tick(0.5).is_empty());
        assert_eq!(arena.tick(0.6), vec![real]);
        assert!(arena.get(real).is_none());

        // Placeholders wait indefinitely
        arena.tick(100.0);
        assert!(arena.get(idle).is_some());
        assert_eq!(arena.in_flight(), 0);
    }

    #[test]
    fn activated_placeholder_collides_and_expires() {
        let mut arena = ProjectileArena::new();
        let ghost = arena.spawn_idle_ghost(Vec3::new(1.0, 1.0, 0.0));
        assert!(!arena.get(ghost).unwrap().collidable);

        assert!(arena.activate(ghost, Vec2::new(0.0, 20.0), 2.0));
        let projectile = arena.get(ghost).unwrap();
        assert!(projectile.collidable);
        assert_eq!(projectile.velocity, Vec2::new(0.0, 20.0));
        assert_eq!(arena.in_flight(), 1);

        assert_eq!(arena.tick(2.0), vec![ghost]);
        assert!(arena.is_empty());
    }

    #[test]
    fn activating_disposed_handle_fails() {
        let mut arena = ProjectileArena::new();
        let ghost = arena.spawn_idle_ghost(Vec3::ZERO);
        assert!(arena.dispose(ghost).is_some());
        assert!(!arena.activate(ghost, Vec2::X, 1.0));
        assert!(arena.dispose(ghost).is_none());
    }
}
