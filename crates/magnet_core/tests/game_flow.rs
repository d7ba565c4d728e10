//! End-to-end room scenarios, driven by ticking rooms directly.

use magnet_core::config::GameConfig;
use magnet_core::magnet::PlayerId;
use magnet_core::protocol::{Outbound, ServerMessage};
use magnet_core::room::{GamePhase, Room};

/// Tick until the turn leaves `actor` or the budget runs out.
fn settle(room: &mut Room, actor: PlayerId) -> Vec<ServerMessage> {
    let mut broadcasts = Vec::new();
    for _ in 0..400 {
        for event in room.tick() {
            if let Outbound::Broadcast(msg) = event {
                broadcasts.push(msg);
            }
        }
        if room.current_turn() != Some(actor) {
            break;
        }
    }
    broadcasts
}

#[test]
fn scenario_a_two_players_ready_up_and_start() {
    let mut room = Room::new("SCENEA".into(), GameConfig::default());
    let (p1, _) = room.join("alice".into()).unwrap();
    let (p2, _) = room.join("bob".into()).unwrap();

    room.mark_ready(p1);
    assert_eq!(room.phase(), GamePhase::Waiting);
    room.mark_ready(p2);

    assert_eq!(room.phase(), GamePhase::Playing);
    assert_eq!(room.current_turn(), Some(p1));
    assert_eq!(room.player(p1).unwrap().remaining(), 8);
    assert_eq!(room.player(p2).unwrap().remaining(), 8);
}

#[test]
fn scenario_b_quiet_placement_passes_the_turn() {
    let mut room = Room::new("SCENEB".into(), GameConfig::default());
    let (p1, _) = room.join("alice".into()).unwrap();
    let (p2, _) = room.join("bob".into()).unwrap();
    room.mark_ready(p1);
    room.mark_ready(p2);

    // Far from every wall and every magnet: nothing in force range.
    room.place_magnet(p1, 300.0, 300.0);
    let broadcasts = settle(&mut room, p1);

    assert!(broadcasts
        .iter()
        .all(|m| !matches!(m, ServerMessage::MagnetsMoved { .. })));
    assert_eq!(room.current_turn(), Some(p2));
    assert_eq!(room.player(p1).unwrap().remaining(), 7);
}

#[test]
fn scenario_c_disturbed_neighbor_changes_owner() {
    let mut room = Room::new("SCENEC".into(), GameConfig::default());
    let (p1, _) = room.join("alice".into()).unwrap();
    let (p2, _) = room.join("bob".into()).unwrap();
    room.mark_ready(p1);
    room.mark_ready(p2);

    // Round 1: both place far apart.
    room.place_magnet(p1, 200.0, 200.0);
    settle(&mut room, p1);
    room.place_magnet(p2, 900.0, 600.0);
    settle(&mut room, p2);

    let p2_magnet = room
        .magnets()
        .placed_ids()
        .into_iter()
        .find(|&id| room.magnets().get(id).unwrap().owner == p2)
        .unwrap();
    let before = room.player(p1).unwrap().remaining();

    // p1 places 60 units from p2's magnet: well inside the force band,
    // enough to drag it past the movement threshold.
    room.place_magnet(p1, 960.0, 600.0);
    let broadcasts = settle(&mut room, p1);

    let moved = broadcasts.iter().find_map(|m| match m {
        ServerMessage::MagnetsMoved { moved_magnets } => Some(moved_magnets.clone()),
        _ => None,
    });
    assert_eq!(moved, Some(vec![p2_magnet]));

    // Both the failed placement and the disturbed magnet are on p1's
    // stack now: net +1 relative to before the attempt.
    assert_eq!(room.player(p1).unwrap().remaining(), before + 1);
    assert_eq!(room.magnets().get(p2_magnet).unwrap().owner, p1);
    // The turn advanced regardless of the outcome.
    assert_eq!(room.current_turn(), Some(p2));
}

#[test]
fn scenario_d_emptied_stack_wins() {
    let config = GameConfig {
        min_magnet_count: 1,
        default_magnet_count: 1,
        ..GameConfig::default()
    };
    let mut room = Room::new("SCENED".into(), config);
    let (p1, _) = room.join("alice".into()).unwrap();
    let (p2, _) = room.join("bob".into()).unwrap();
    room.mark_ready(p1);
    room.mark_ready(p2);

    room.place_magnet(p1, 300.0, 300.0);
    let broadcasts = settle(&mut room, p1);

    let winner = broadcasts.iter().find_map(|m| match m {
        ServerMessage::GameOver { winner } => Some(winner.id),
        _ => None,
    });
    assert_eq!(winner, Some(p1));
    assert_eq!(room.phase(), GamePhase::Finished);
    assert_eq!(room.winner(), Some(p1));

    // The finished room ignores further commands.
    room.place_magnet(p2, 600.0, 600.0);
    assert_eq!(room.player(p2).unwrap().remaining(), 1);
}
