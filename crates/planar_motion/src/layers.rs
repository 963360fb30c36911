//! Collision layers and the collider filter the motor consults

use planar_math::Vec3;
use serde::{Deserialize, Serialize};

/// Bit index of a collision layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    pub const DEFAULT: Self = Self(0);
    pub const CHARACTER: Self = Self(1);
    pub const ENVIRONMENT: Self = Self(2);
    /// Platforms that can be passed from below
    pub const ONE_WAY: Self = Self(3);
    pub const TRIGGERS: Self = Self(4);
    pub const HAZARDS: Self = Self(5);

    #[inline]
    pub const fn bit(self) -> u32 {
        1 << self.0
    }
}

/// Membership and filter masks; two groups interact only if each one's
/// membership is accepted by the other's filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGroups {
    pub memberships: u32,
    pub filter: u32,
}

impl CollisionGroups {
    pub const ALL: Self = Self { memberships: u32::MAX, filter: u32::MAX };

    /// Member of `layer`, accepting each of `accepts`
    pub fn from_layer(layer: CollisionLayer, accepts: &[CollisionLayer]) -> Self {
        Self {
            memberships: layer.bit(),
            filter: accepts.iter().map(|l| l.bit()).fold(0, |mask, bit| mask | bit),
        }
    }

    /// Groups a character uses by default
    pub fn character() -> Self {
        use CollisionLayer as L;
        Self::from_layer(L::CHARACTER, &[L::DEFAULT, L::ENVIRONMENT, L::ONE_WAY, L::HAZARDS])
    }

    #[inline]
    pub fn can_collide(&self, other: &Self) -> bool {
        self.memberships & other.filter != 0 && other.memberships & self.filter != 0
    }

    #[inline]
    pub fn is_member(&self, layer: CollisionLayer) -> bool {
        self.memberships & layer.bit() != 0
    }

    pub fn accepting(mut self, layer: CollisionLayer) -> Self {
        self.filter |= layer.bit();
        self
    }

    pub fn rejecting(mut self, layer: CollisionLayer) -> Self {
        self.filter &= !layer.bit();
        self
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::ALL
    }
}

/// What the host motor knows about a collider it is about to sweep against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderInfo {
    pub groups: CollisionGroups,
    /// Solid side of a one-way platform
    pub one_way_up: Option<Vec3>,
}

impl ColliderInfo {
    fn on_layer(layer: CollisionLayer, one_way_up: Option<Vec3>) -> Self {
        Self {
            groups: CollisionGroups::from_layer(layer, &[CollisionLayer::CHARACTER]),
            one_way_up,
        }
    }

    pub fn solid() -> Self {
        Self::on_layer(CollisionLayer::ENVIRONMENT, None)
    }

    pub fn one_way(up: Vec3) -> Self {
        Self::on_layer(CollisionLayer::ONE_WAY, Some(up))
    }

    pub fn trigger() -> Self {
        Self::on_layer(CollisionLayer::TRIGGERS, None)
    }
}

/// Whether a character with `groups` moving at `velocity` should collide
///
/// Trigger colliders never block. One-way platforms let the character
/// through while it moves against their solid side.
pub fn collider_blocks(groups: &CollisionGroups, collider: &ColliderInfo, velocity: Vec3) -> bool {
    if collider.groups.is_member(CollisionLayer::TRIGGERS) || !groups.can_collide(&collider.groups) {
        return false;
    }
    collider.one_way_up.map_or(true, |up| velocity.dot(up) <= 0.0)
}
