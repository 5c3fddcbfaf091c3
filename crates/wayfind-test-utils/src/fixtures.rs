//! Reusable room layouts and agent rosters.
//!
//! - [`four_room_layout`]: four rooms on a 20-unit square, each with a door.
//! - [`line_layout`]: `n` rooms ten units apart on the x axis.
//! - [`homes`]: `n` home poses clear of the origin.

use wayfind_core::{Pose, RoomId, Vec3};
use wayfind_rooms::Room;

/// Rooms 0..4 at the corners of a 20-unit square centered on (10, 0, 10).
pub fn four_room_layout() -> Vec<Room> {
    [(0.0, 0.0), (20.0, 0.0), (0.0, 20.0), (20.0, 20.0)]
        .into_iter()
        .enumerate()
        .map(|(i, (x, z))| {
            Room::new(RoomId(i as u32), Vec3::new(x, 0.0, z))
                .with_door(Vec3::new(x, 0.0, z - 4.0))
                .with_random_rotation(true)
        })
        .collect()
}

/// `n` unrotated rooms at x = 0, 10, 20, ...
pub fn line_layout(n: u32) -> Vec<Room> {
    (0..n)
        .map(|i| Room::new(RoomId(i), Vec3::new(i as f32 * 10.0, 0.0, 0.0)))
        .collect()
}

/// `n` home poses on the line z = -5, starting at x = 1.
pub fn homes(n: u32) -> Vec<Pose> {
    (0..n)
        .map(|i| Pose::new(Vec3::new(1.0 + i as f32 * 2.0, 0.0, -5.0), 0.0))
        .collect()
}
