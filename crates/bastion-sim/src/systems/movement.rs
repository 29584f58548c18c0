//! Path movement system.
//!
//! Moves every enabled mover toward `waypoint[index] + offset` at constant
//! speed. Reaching the final waypoint marks the traversal complete and
//! reports the entity once.

use hecs::{Entity, World};

use bastion_core::components::{Mover, PoolMember, Transform};
use bastion_core::constants::WAYPOINT_REACHED_RADIUS;
use bastion_core::types::{move_towards, Vec2};

/// Reset the traversal. Snaps to the first waypoint only when both
/// `snap_to_first` and `override_start` are set.
pub fn initialize_position(mover: &mut Mover, position: &mut Vec2) {
    mover.waypoint_index = 0;
    mover.path_complete = false;
    if mover.snap_to_first && mover.override_start {
        if let Some(first) = mover.path.waypoint(0) {
            *position = first + mover.offset;
        }
    }
}

/// Advance one mover by `dt`. Returns true on the step that completes the path.
pub fn step(mover: &mut Mover, position: &mut Vec2, dt: f32) -> bool {
    if !mover.enabled || mover.path_complete {
        return false;
    }
    let Some(waypoint) = mover.path.waypoint(mover.waypoint_index) else {
        return false;
    };

    let target = waypoint + mover.offset;
    *position = move_towards(*position, target, mover.speed * dt);

    if position.distance(target) < WAYPOINT_REACHED_RADIUS {
        if mover.waypoint_index + 1 >= mover.path.waypoint_count() {
            mover.path_complete = true;
            return true;
        }
        mover.waypoint_index += 1;
    }
    false
}

/// Move all active movers; entities that reached the path end this tick are
/// pushed onto `arrived`.
pub fn run(world: &mut World, dt: f32, arrived: &mut Vec<Entity>) {
    arrived.clear();
    for (entity, (member, mover, transform)) in
        world.query_mut::<(&PoolMember, &mut Mover, &mut Transform)>()
    {
        if !member.active {
            continue;
        }
        if step(mover, &mut transform.position, dt) {
            arrived.push(entity);
        }
    }
}
