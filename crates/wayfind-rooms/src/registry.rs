//! The room registry: every room of the layout plus the goal room.
//!
//! Rooms are kept in insertion order so that seeded goal selection is
//! reproducible across runs.

use indexmap::IndexMap;
use log::warn;
use rand::Rng;
use wayfind_core::{ConfigError, RoomError, RoomId, SelectionError, Vec3};

use crate::room::Room;
use crate::selection::GoalSelection;

/// How an agent entering a room should be rewarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomEntry {
    /// The goal room, entered by an agent that had not found it yet.
    FoundGoalRoom,
    /// The goal room again, by an agent that already found it.
    GoalRoomAgain,
    /// A non-goal room that was already visited this episode.
    Revisit,
    /// First visit to a non-goal room. The room is now marked visited.
    Discovered,
}

/// Outcome of goal selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalPick {
    /// The selected goal room.
    pub room: RoomId,
    /// `true` when radius selection found no candidate and the pick
    /// came from the global pool instead.
    pub fell_back: bool,
}

/// Owns the rooms of a layout and the current goal room.
#[derive(Clone, Debug)]
pub struct RoomRegistry {
    rooms: IndexMap<RoomId, Room>,
    goal: Option<RoomId>,
}

impl RoomRegistry {
    /// Build a registry from a layout.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoRooms`] if the layout is empty,
    /// [`ConfigError::DuplicateRoom`] if two rooms share an id.
    pub fn new(rooms: impl IntoIterator<Item = Room>) -> Result<Self, ConfigError> {
        let mut map = IndexMap::new();
        for room in rooms {
            let id = room.id();
            if map.insert(id, room).is_some() {
                return Err(ConfigError::DuplicateRoom(id));
            }
        }
        if map.is_empty() {
            return Err(ConfigError::NoRooms);
        }
        Ok(Self {
            rooms: map,
            goal: None,
        })
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Always `false` for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Look up a room.
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    /// Look up a room mutably.
    pub fn get_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    /// Whether `id` names a registered room.
    pub fn contains(&self, id: RoomId) -> bool {
        self.rooms.contains_key(&id)
    }

    /// Rooms in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Room ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.keys().copied()
    }

    /// Start a new episode for every room and forget the goal.
    pub fn initialize_all<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for room in self.rooms.values_mut() {
            room.initialize(rng);
        }
        self.goal = None;
    }

    /// Uniform pick over every room.
    pub fn select_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RoomId, SelectionError> {
        if self.rooms.is_empty() {
            return Err(SelectionError::NoRooms);
        }
        let i = rng.random_range(0..self.rooms.len());
        self.rooms
            .get_index(i)
            .map(|(id, _)| *id)
            .ok_or(SelectionError::NoRooms)
    }

    /// Uniform pick over rooms whose center lies within `radius` of
    /// `center` (inclusive, 3D distance).
    pub fn select_within<R: Rng + ?Sized>(
        &self,
        center: Vec3,
        radius: f32,
        rng: &mut R,
    ) -> Result<RoomId, SelectionError> {
        if self.rooms.is_empty() {
            return Err(SelectionError::NoRooms);
        }
        let candidates: Vec<RoomId> = self
            .rooms
            .values()
            .filter(|r| r.center().distance(center) <= radius)
            .map(Room::id)
            .collect();
        if candidates.is_empty() {
            return Err(SelectionError::EmptyCandidateSet { radius });
        }
        Ok(candidates[rng.random_range(0..candidates.len())])
    }

    /// Pick and store the goal room for this episode.
    ///
    /// `anchor` is used for radius selection when the policy has no
    /// configured center. An empty radius candidate set falls back to
    /// global selection with a warning.
    pub fn select_goal<R: Rng + ?Sized>(
        &mut self,
        policy: &GoalSelection,
        anchor: Vec3,
        rng: &mut R,
    ) -> Result<GoalPick, SelectionError> {
        let pick = match *policy {
            GoalSelection::Global => GoalPick {
                room: self.select_uniform(rng)?,
                fell_back: false,
            },
            GoalSelection::WithinRadius { radius, center } => {
                let center = center.unwrap_or(anchor);
                match self.select_within(center, radius, rng) {
                    Ok(room) => GoalPick {
                        room,
                        fell_back: false,
                    },
                    Err(SelectionError::EmptyCandidateSet { radius }) => {
                        warn!(
                            "no room within {radius} of {center:?}; selecting goal from all rooms"
                        );
                        GoalPick {
                            room: self.select_uniform(rng)?,
                            fell_back: true,
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
        };
        self.goal = Some(pick.room);
        Ok(pick)
    }

    /// Current goal room id, if one was selected.
    pub fn goal(&self) -> Option<RoomId> {
        self.goal
    }

    /// Current goal room, if one was selected.
    pub fn goal_room(&self) -> Option<&Room> {
        self.goal.and_then(|id| self.rooms.get(&id))
    }

    /// Whether `id` is the current goal room.
    pub fn is_goal(&self, id: RoomId) -> bool {
        self.goal == Some(id)
    }

    /// Mark a room visited. `Ok(true)` only on the first call this episode.
    pub fn mark_visited(&mut self, id: RoomId) -> Result<bool, RoomError> {
        self.rooms
            .get_mut(&id)
            .map(Room::mark_visited)
            .ok_or(RoomError::UnknownRoom(id))
    }

    /// Classify an agent entering `id`.
    ///
    /// `goal_already_found` is the entering agent's own flag. A
    /// discovered room is marked visited here so that a second entry
    /// classifies as [`RoomEntry::Revisit`].
    pub fn enter(&mut self, id: RoomId, goal_already_found: bool) -> Result<RoomEntry, RoomError> {
        let is_goal = self.is_goal(id);
        let room = self.rooms.get_mut(&id).ok_or(RoomError::UnknownRoom(id))?;
        if is_goal {
            return Ok(if goal_already_found {
                RoomEntry::GoalRoomAgain
            } else {
                RoomEntry::FoundGoalRoom
            });
        }
        if room.mark_visited() {
            Ok(RoomEntry::Discovered)
        } else {
            Ok(RoomEntry::Revisit)
        }
    }

    /// An agent left `id`. Non-goal rooms are forced to visited.
    ///
    /// Returns whether this call flipped the visited flag.
    pub fn exit(&mut self, id: RoomId) -> Result<bool, RoomError> {
        if self.is_goal(id) {
            return if self.contains(id) {
                Ok(false)
            } else {
                Err(RoomError::UnknownRoom(id))
            };
        }
        self.mark_visited(id)
    }

    /// An agent walked through the door of `id`.
    ///
    /// Returns `Ok(true)` only for the goal room's door, the first time
    /// this episode.
    pub fn pass_door(&mut self, id: RoomId) -> Result<bool, RoomError> {
        let is_goal = self.is_goal(id);
        let room = self.rooms.get_mut(&id).ok_or(RoomError::UnknownRoom(id))?;
        if !is_goal || room.door().is_none() {
            return Ok(false);
        }
        Ok(room.pass_door())
    }

    /// Number of rooms visited this episode.
    pub fn visited_count(&self) -> usize {
        self.rooms.values().filter(|r| r.is_visited()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Four rooms on a line, ten units apart.
    fn line_layout() -> RoomRegistry {
        RoomRegistry::new((0..4).map(|i| {
            Room::new(RoomId(i), Vec3::new(i as f32 * 10.0, 0.0, 0.0))
                .with_door(Vec3::new(i as f32 * 10.0 - 4.0, 0.0, 0.0))
        }))
        .unwrap()
    }

    fn with_goal(reg: &mut RoomRegistry, id: RoomId) {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // A tiny radius around the room center only ever yields that room.
        let center = reg.get(id).unwrap().center();
        let pick = reg
            .select_goal(
                &GoalSelection::WithinRadius {
                    radius: 0.5,
                    center: Some(center),
                },
                Vec3::ZERO,
                &mut rng,
            )
            .unwrap();
        assert_eq!(pick.room, id);
    }

    #[test]
    fn empty_layout_rejected() {
        let err = RoomRegistry::new(Vec::new()).unwrap_err();
        assert_eq!(err, ConfigError::NoRooms);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let rooms = vec![
            Room::new(RoomId(1), Vec3::ZERO),
            Room::new(RoomId(1), Vec3::new(5.0, 0.0, 0.0)),
        ];
        assert_eq!(
            RoomRegistry::new(rooms).unwrap_err(),
            ConfigError::DuplicateRoom(RoomId(1))
        );
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let reg = RoomRegistry::new(vec![
            Room::new(RoomId(9), Vec3::ZERO),
            Room::new(RoomId(2), Vec3::ZERO),
            Room::new(RoomId(5), Vec3::ZERO),
        ])
        .unwrap();
        let ids: Vec<_> = reg.ids().collect();
        assert_eq!(ids, vec![RoomId(9), RoomId(2), RoomId(5)]);
    }

    #[test]
    fn radius_selection_only_picks_nearby_rooms() {
        let reg = line_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..100 {
            let id = reg.select_within(Vec3::ZERO, 10.0, &mut rng).unwrap();
            assert!(id == RoomId(0) || id == RoomId(1));
        }
    }

    #[test]
    fn radius_selection_empty_set_is_error() {
        let reg = line_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let err = reg
            .select_within(Vec3::new(0.0, 0.0, 500.0), 1.0, &mut rng)
            .unwrap_err();
        assert_eq!(err, SelectionError::EmptyCandidateSet { radius: 1.0 });
    }

    #[test]
    fn select_goal_falls_back_to_global() {
        let mut reg = line_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let pick = reg
            .select_goal(
                &GoalSelection::WithinRadius {
                    radius: 1.0,
                    center: None,
                },
                Vec3::new(0.0, 0.0, 500.0),
                &mut rng,
            )
            .unwrap();
        assert!(pick.fell_back);
        assert!(reg.contains(pick.room));
        assert_eq!(reg.goal(), Some(pick.room));
    }

    #[test]
    fn radius_anchor_used_without_configured_center() {
        let mut reg = line_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let pick = reg
            .select_goal(
                &GoalSelection::WithinRadius {
                    radius: 2.0,
                    center: None,
                },
                Vec3::new(30.0, 0.0, 1.0),
                &mut rng,
            )
            .unwrap();
        assert_eq!(pick.room, RoomId(3));
        assert!(!pick.fell_back);
    }

    #[test]
    fn enter_classifies_discovery_revisit_and_goal() {
        let mut reg = line_layout();
        with_goal(&mut reg, RoomId(2));

        assert_eq!(reg.enter(RoomId(0), false), Ok(RoomEntry::Discovered));
        assert_eq!(reg.enter(RoomId(0), false), Ok(RoomEntry::Revisit));
        assert_eq!(reg.enter(RoomId(2), false), Ok(RoomEntry::FoundGoalRoom));
        assert_eq!(reg.enter(RoomId(2), true), Ok(RoomEntry::GoalRoomAgain));
        assert!(!reg.get(RoomId(2)).unwrap().is_visited());
    }

    #[test]
    fn exit_forces_visited_except_goal() {
        let mut reg = line_layout();
        with_goal(&mut reg, RoomId(2));
        assert_eq!(reg.exit(RoomId(1)), Ok(true));
        assert_eq!(reg.exit(RoomId(1)), Ok(false));
        assert_eq!(reg.exit(RoomId(2)), Ok(false));
        assert!(!reg.get(RoomId(2)).unwrap().is_visited());
        assert_eq!(reg.enter(RoomId(1), false), Ok(RoomEntry::Revisit));
    }

    #[test]
    fn unknown_rooms_are_reported() {
        let mut reg = line_layout();
        assert_eq!(
            reg.enter(RoomId(77), false),
            Err(RoomError::UnknownRoom(RoomId(77)))
        );
        assert_eq!(reg.exit(RoomId(77)), Err(RoomError::UnknownRoom(RoomId(77))));
        assert_eq!(
            reg.mark_visited(RoomId(77)),
            Err(RoomError::UnknownRoom(RoomId(77)))
        );
    }

    #[test]
    fn door_counts_only_for_goal_once() {
        let mut reg = line_layout();
        with_goal(&mut reg, RoomId(1));
        assert_eq!(reg.pass_door(RoomId(0)), Ok(false));
        assert_eq!(reg.pass_door(RoomId(1)), Ok(true));
        assert_eq!(reg.pass_door(RoomId(1)), Ok(false));
    }

    #[test]
    fn initialize_all_clears_visits_and_goal() {
        let mut reg = line_layout();
        with_goal(&mut reg, RoomId(1));
        reg.enter(RoomId(0), false).unwrap();
        reg.exit(RoomId(3)).unwrap();
        assert_eq!(reg.visited_count(), 2);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        reg.initialize_all(&mut rng);
        assert_eq!(reg.visited_count(), 0);
        assert_eq!(reg.goal(), None);
    }

    #[test]
    fn same_seed_same_goal_sequence() {
        let mut a = line_layout();
        let mut b = line_layout();
        let mut ra = ChaCha8Rng::seed_from_u64(21);
        let mut rb = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..10 {
            let pa = a.select_goal(&GoalSelection::Global, Vec3::ZERO, &mut ra);
            let pb = b.select_goal(&GoalSelection::Global, Vec3::ZERO, &mut rb);
            assert_eq!(pa, pb);
        }
    }

    proptest! {
        #[test]
        fn discovery_granted_at_most_once_per_room(
            entries in proptest::collection::vec(0u32..4, 0..40),
        ) {
            let mut reg = line_layout();
            with_goal(&mut reg, RoomId(3));
            let mut discovered = [0u32; 4];
            for id in entries {
                if reg.enter(RoomId(id), false).unwrap() == RoomEntry::Discovered {
                    discovered[id as usize] += 1;
                }
            }
            prop_assert!(discovered.iter().all(|&n| n <= 1));
            prop_assert_eq!(discovered[3], 0);
        }
    }
}
