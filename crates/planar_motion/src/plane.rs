//! Dynamic plane constraint
//!
//! Plane volumes and plane breakers each occupy a primary and a secondary
//! slot. A volume entered while another one is primary becomes secondary if
//! the primary was registered with `prioritize`, otherwise it takes over and
//! the old primary drops to secondary. Each tick the orchestrator asks
//! [`PlaneSystem::select`] for the plane to follow; breakers only steer a
//! grounded character moving faster than the attach speed.

use crate::contributor::MotionContext;
use crate::error::{MotionError, Result};
use crate::events::MotionEvent;
use planar_math::{Plane, Quat, Vec3};
use planar_triggers::{PlanePath, VolumeId};
use std::collections::BTreeMap;

const PLANE_EPSILON: f32 = 1e-5;

/// Role of a plane volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneVolumeKind {
    /// Redefines the movement plane while inside
    Dynamic,
    /// Lets a fast grounded character leave the current plane along a path
    Breaker,
}

#[derive(Debug, Clone)]
pub struct PlaneVolume {
    pub kind: PlaneVolumeKind,
    pub path: PlanePath,
    /// Keep the primary slot when another volume of the same kind is entered
    pub prioritize: bool,
}

/// A plane switch waiting to be applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneRequest {
    pub plane: Plane,
    pub from_breaker: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slots {
    primary: Option<VolumeId>,
    secondary: Option<VolumeId>,
}

impl Slots {
    fn enter(&mut self, id: VolumeId, primary_prioritized: bool) {
        if self.primary == Some(id) || self.secondary == Some(id) {
            return;
        }
        match self.primary {
            None => self.primary = Some(id),
            Some(_) if primary_prioritized => self.secondary = Some(id),
            Some(current) => {
                self.secondary = Some(current);
                self.primary = Some(id);
            }
        }
    }

    fn exit(&mut self, id: VolumeId) {
        if self.primary == Some(id) {
            self.primary = self.secondary.take();
        } else if self.secondary == Some(id) {
            self.secondary = None;
        }
    }

    fn is_empty(&self) -> bool {
        self.primary.is_none()
    }
}

/// Registry and occupancy of the plane volumes around one character
#[derive(Debug, Clone, Default)]
pub struct PlaneSystem {
    volumes: BTreeMap<VolumeId, PlaneVolume>,
    dynamic: Slots,
    breakers: Slots,
    broken_plane: Option<Plane>,
    pending: Option<PlaneRequest>,
}

impl PlaneSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: VolumeId, volume: PlaneVolume) -> Result<()> {
        if self.volumes.contains_key(&id) {
            return Err(MotionError::InvalidVolume {
                id,
                reason: "already registered".to_string(),
            });
        }
        log::debug!("registered {:?} plane volume {:?}", volume.kind, id);
        self.volumes.insert(id, volume);
        Ok(())
    }

    pub fn unregister(&mut self, id: VolumeId) -> Option<PlaneVolume> {
        self.dynamic.exit(id);
        self.breakers.exit(id);
        self.volumes.remove(&id)
    }

    pub fn volume(&self, id: VolumeId) -> Option<&PlaneVolume> {
        self.volumes.get(&id)
    }

    pub fn contains(&self, id: VolumeId) -> bool {
        self.volumes.contains_key(&id)
    }

    pub fn primary_dynamic(&self) -> Option<VolumeId> {
        self.dynamic.primary
    }

    pub fn primary_breaker(&self) -> Option<VolumeId> {
        self.breakers.primary
    }

    /// Plane to restore once every breaker has been left
    pub fn broken_plane(&self) -> Option<Plane> {
        self.broken_plane
    }

    /// The character entered volume `id` while `current` was active
    pub fn on_enter(&mut self, id: VolumeId, current: Plane) {
        let Some(volume) = self.volumes.get(&id) else {
            log::warn!("enter from unregistered plane volume {:?}", id);
            return;
        };

        let slots = match volume.kind {
            PlaneVolumeKind::Dynamic => &mut self.dynamic,
            PlaneVolumeKind::Breaker => {
                if self.breakers.is_empty() && self.broken_plane.is_none() {
                    self.broken_plane = Some(current);
                }
                &mut self.breakers
            }
        };
        let prioritized = slots
            .primary
            .and_then(|primary| self.volumes.get(&primary))
            .is_some_and(|primary| primary.prioritize);
        slots.enter(id, prioritized);
    }

    pub fn on_exit(&mut self, id: VolumeId) {
        let Some(volume) = self.volumes.get(&id) else {
            log::warn!("exit from unregistered plane volume {:?}", id);
            return;
        };

        match volume.kind {
            PlaneVolumeKind::Dynamic => self.dynamic.exit(id),
            PlaneVolumeKind::Breaker => {
                self.breakers.exit(id);
                if !self.breakers.is_empty() {
                    return;
                }
                let broken = self.broken_plane.take();
                if let (Some(plane), true) = (broken, self.dynamic.is_empty()) {
                    log::debug!("left last breaker, restoring plane {:?}", plane.normal);
                    self.request(plane, true);
                }
            }
        }
    }

    /// Queue a switch for the start of the next tick; a later request replaces an earlier one
    pub fn request(&mut self, plane: Plane, from_breaker: bool) {
        self.pending = Some(PlaneRequest { plane, from_breaker });
    }

    pub fn take_pending(&mut self) -> Option<PlaneRequest> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Plane the occupied volumes want the character on right now
    pub fn select(
        &self,
        position: Vec3,
        travel: Vec3,
        grounded: bool,
        speed: f32,
        attach_speed: f32,
    ) -> Option<PlaneRequest> {
        if let Some(breaker) = self.breakers.primary.and_then(|id| self.volumes.get(&id)) {
            if grounded && speed > attach_speed {
                return breaker
                    .path
                    .closest_plane(position, travel)
                    .map(|plane| PlaneRequest {
                        plane,
                        from_breaker: true,
                    });
            }
        }

        let dynamic = self.dynamic.primary.and_then(|id| self.volumes.get(&id))?;
        dynamic
            .path
            .closest_plane(position, travel)
            .map(|plane| PlaneRequest {
                plane,
                from_breaker: false,
            })
    }
}

/// Move the character onto a new plane
///
/// Velocity is rotated with the plane so speed and relative heading are
/// kept, and `position` is snapped onto the new plane. Degenerate requests
/// and requests for the plane already active do nothing and return `None`;
/// otherwise the applied rotation is returned.
pub fn switch_plane(ctx: &mut MotionContext, position: &mut Vec3, request: PlaneRequest) -> Option<Quat> {
    if request.plane.normal.length_squared() < PLANE_EPSILON || !request.plane.distance.is_finite() {
        log::trace!("ignoring degenerate plane request");
        return None;
    }

    let old = ctx.plane;
    let new = request.plane.aligned_with(old.normal);
    if new.approx_eq(&old, PLANE_EPSILON) {
        return None;
    }

    let rotation = Quat::from_rotation_arc(old.normal, new.normal);
    ctx.state.velocity = rotation.rotate(ctx.state.velocity);
    ctx.plane = new;
    *position = new.closest_point(*position);

    log::debug!(
        "plane switch {:?} -> {:?} (breaker: {})",
        old.normal,
        new.normal,
        request.from_breaker
    );
    ctx.events.publish(MotionEvent::PlaneChanged {
        normal: new.normal,
        from_breaker: request.from_breaker,
    });
    Some(rotation)
}
