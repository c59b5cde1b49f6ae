use serde::Serialize;

use super::entity::EntityID;
use super::snapshot::as_coordinates;
use crate::math::geometry::Position;

/// Where a ship is, navigationally speaking. Exactly one of these holds at a
/// time; transitions are:
/// - Docked -> Flying, via [Entity::fly_to](super::Entity::fly_to)
/// - Flying -> Docked, via [Entity::dock_to](super::Entity::dock_to) or by
///   arriving within the arrival tolerance during [NavState::step]
/// - anything -> Docked via `dock_to`, anything -> Flying via `fly_to`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NavState {
    Docked {
        #[serde(rename = "anchor_id")]
        anchor: EntityID,
    },
    Flying {
        #[serde(rename = "destination_id")]
        destination: EntityID,
        #[serde(serialize_with = "as_coordinates")]
        start_position: Position,
    },
}

impl NavState {
    /// The dock while docked, the destination while flying.
    pub fn target(&self) -> EntityID {
        match self {
            NavState::Docked { anchor } => *anchor,
            NavState::Flying { destination, .. } => *destination,
        }
    }

    pub fn is_docked(&self) -> bool {
        matches!(self, NavState::Docked { .. })
    }

    pub fn is_docked_at(&self, id: EntityID) -> bool {
        matches!(self, NavState::Docked { anchor } if *anchor == id)
    }

    /// One tick of movement. Returns the next state and position, given the
    /// target's position for this tick and how far the ship may travel.
    ///
    /// Docked ships snap onto their (possibly moving) anchor. Flying ships
    /// within `arrival_tolerance` of the destination dock instead of moving;
    /// otherwise they close in along the straight line, never past the
    /// destination.
    #[allow(clippy::float_cmp)]
    pub fn step(
        &self,
        position: &Position,
        target_position: &Position,
        travel_distance: f64,
        arrival_tolerance: f64,
    ) -> (NavState, Position) {
        match *self {
            NavState::Docked { .. } => (*self, *target_position),
            NavState::Flying { destination, .. } => {
                let delta = target_position - position;
                let distance = delta.norm();

                if distance <= arrival_tolerance {
                    return (
                        NavState::Docked {
                            anchor: destination,
                        },
                        *target_position,
                    );
                }
                if distance == 0.0 {
                    return (*self, *position);
                }

                let fraction = (travel_distance / distance).min(1.0);
                (*self, position + delta * fraction)
            }
        }
    }
}
