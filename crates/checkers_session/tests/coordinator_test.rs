//! Tests for host-side session coordination.

use checkers_core::{PieceKind, Position, Seat, SeatMode, Team};
use checkers_session::{
    ConnectionId, ControlSignal, HOST_CONNECTION, HostMessage, IntentOutcome, MoveIntent, Outbox,
    PeerMessage, SeatAssignment, SessionConfig, SessionCoordinator,
};

/// Where a recorded message went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    To(ConnectionId),
    Everyone,
}

#[derive(Debug, Default)]
struct RecordingOutbox {
    sent: Vec<(Route, HostMessage)>,
}

impl Outbox for RecordingOutbox {
    fn send(&mut self, to: ConnectionId, message: HostMessage) {
        self.sent.push((Route::To(to), message));
    }

    fn broadcast(&mut self, message: HostMessage) {
        self.sent.push((Route::Everyone, message));
    }
}

fn coordinator(mode: SeatMode) -> SessionCoordinator<RecordingOutbox> {
    let config = SessionConfig::default().with_seat_mode(mode);
    SessionCoordinator::new(&config, RecordingOutbox::default()).expect("valid config")
}

fn take_sent(coordinator: &mut SessionCoordinator<RecordingOutbox>) -> Vec<(Route, HostMessage)> {
    std::mem::take(&mut coordinator.outbox_mut().sent)
}

fn intent(from: (i32, i32), to: (i32, i32)) -> MoveIntent {
    MoveIntent::new(from.0, from.1, to.0, to.1)
}

fn has_control(sent: &[(Route, HostMessage)], route: Route, signal: ControlSignal) -> bool {
    sent.iter()
        .any(|(r, m)| *r == route && *m == HostMessage::Control(signal))
}

#[test]
fn test_host_alone_does_not_start() {
    let mut session = coordinator(SeatMode::Two);
    assert!(!session.is_started());
    assert_eq!(session.seat_of(HOST_CONNECTION), Some(Seat::One));

    let before = session.game().board().clone();
    assert_eq!(
        session.handle_move_intent(HOST_CONNECTION, intent((1, 0), (2, 1))),
        IntentOutcome::NotAccepting
    );
    assert_eq!(
        session.handle_move_intent(42, intent((4, 1), (3, 0))),
        IntentOutcome::NotAccepting
    );
    assert_eq!(session.game().board(), &before);
    assert!(!session.snapshot().is_started);
}

#[test]
fn test_host_is_told_its_seat() {
    let mut session = coordinator(SeatMode::Two);
    let sent = take_sent(&mut session);
    assert_eq!(
        sent.first(),
        Some(&(
            Route::To(HOST_CONNECTION),
            HostMessage::SeatAssignment(SeatAssignment::seated(Seat::One))
        ))
    );
    assert!(has_control(&sent, Route::Everyone, ControlSignal::BoardReset));
}

#[test]
fn test_team_b_join_starts_two_seat_match() {
    let mut session = coordinator(SeatMode::Two);
    take_sent(&mut session);

    assert_eq!(session.handle_connect(1), Some(Seat::Two));
    assert!(session.is_started());

    let sent = take_sent(&mut session);
    assert_eq!(
        sent[0],
        (
            Route::To(1),
            HostMessage::SeatAssignment(SeatAssignment::seated(Seat::Two))
        )
    );
    assert!(has_control(&sent, Route::Everyone, ControlSignal::MatchStarted));
    let Some((Route::Everyone, HostMessage::Snapshot(snapshot))) = sent.last() else {
        panic!("match start ends with a snapshot broadcast");
    };
    assert!(snapshot.is_started);
    assert_eq!(snapshot.acting_seat(), Some(Seat::One));
}

#[test]
fn test_extra_peer_becomes_spectator() {
    let mut session = coordinator(SeatMode::Two);
    session.handle_connect(1);
    take_sent(&mut session);

    assert_eq!(session.handle_connect(2), None);
    assert!(session.is_spectator(2));

    let sent = take_sent(&mut session);
    assert_eq!(
        sent[0],
        (
            Route::To(2),
            HostMessage::SeatAssignment(SeatAssignment::spectator())
        )
    );
    assert!(has_control(&sent, Route::To(2), ControlSignal::MatchStarted));
    assert!(matches!(sent.last(), Some((Route::To(2), HostMessage::Snapshot(_)))));

    assert_eq!(
        session.handle_move_intent(2, intent((1, 0), (2, 1))),
        IntentOutcome::Unseated
    );
}

#[test]
fn test_moves_alternate_between_host_and_peer() {
    let mut session = coordinator(SeatMode::Two);
    session.handle_connect(1);

    assert_eq!(
        session.handle_move_intent(HOST_CONNECTION, intent((1, 0), (2, 1))),
        IntentOutcome::Applied
    );
    assert_eq!(session.game().current_team(), Team::B);
    assert_eq!(session.acting_seat(), Seat::Two);

    take_sent(&mut session);
    session.handle_message(1, PeerMessage::MoveIntent(intent((4, 1), (3, 0))));
    assert_eq!(session.game().current_team(), Team::A);
    assert_eq!(
        session.game().board().get(Position::new(3, 0)),
        Some(PieceKind::Man(Team::B))
    );

    let sent = take_sent(&mut session);
    assert!(!sent.is_empty());
    assert!(sent.iter().all(|(route, _)| *route == Route::Everyone));
    let Some((_, HostMessage::Snapshot(snapshot))) = sent.last() else {
        panic!("applied move ends with a snapshot broadcast");
    };
    assert_eq!(snapshot.acting_seat(), Some(Seat::One));
    assert_eq!(
        snapshot.board().expect("valid snapshot"),
        *session.game().board()
    );
}

#[test]
fn test_every_post_move_snapshot_names_team_to_move() {
    let mut session = coordinator(SeatMode::Two);
    session.handle_connect(1);
    take_sent(&mut session);

    let script = [
        (HOST_CONNECTION, (1, 0), (2, 1)),
        (1, (4, 3), (3, 2)),
        // Capture: also emits a score change before the move.
        (HOST_CONNECTION, (2, 1), (4, 3)),
    ];
    for (id, from, to) in script {
        assert_eq!(
            session.handle_move_intent(id, intent(from, to)),
            IntentOutcome::Applied
        );
        let current = session.game().current_team();
        let snapshots: Vec<_> = take_sent(&mut session)
            .into_iter()
            .filter_map(|(_, message)| match message {
                HostMessage::Snapshot(snapshot) => Some(snapshot),
                _ => None,
            })
            .collect();
        assert!(!snapshots.is_empty());
        for snapshot in snapshots {
            let seat = snapshot.acting_seat().expect("valid seat");
            assert_eq!(seat.team(), current, "after {:?} -> {:?}", from, to);
        }
    }
    assert_eq!(session.game().score_a(), 1);
}

#[test]
fn test_wrong_team_gets_corrective_snapshot() {
    let mut session = coordinator(SeatMode::Two);
    session.handle_connect(1);
    take_sent(&mut session);

    let before = session.game().board().clone();
    assert_eq!(
        session.handle_move_intent(1, intent((4, 1), (3, 0))),
        IntentOutcome::WrongTeam {
            seat: Seat::Two,
            current: Team::A
        }
    );
    assert_eq!(session.game().board(), &before);

    let sent = take_sent(&mut session);
    assert_eq!(sent.len(), 1);
    assert!(matches!(sent[0], (Route::To(1), HostMessage::Snapshot(_))));
}

#[test]
fn test_illegal_intent_changes_nothing() {
    let mut session = coordinator(SeatMode::Two);
    session.handle_connect(1);
    take_sent(&mut session);

    assert_eq!(
        session.handle_move_intent(HOST_CONNECTION, intent((1, 0), (3, 2))),
        IntentOutcome::Illegal
    );
    assert_eq!(session.game().current_team(), Team::A);
    assert!(take_sent(&mut session).is_empty());
}

#[test]
fn test_four_seat_rotation() {
    let mut session = coordinator(SeatMode::Four);
    assert_eq!(session.handle_connect(1), Some(Seat::Two));
    assert!(!session.is_started());
    assert_eq!(session.handle_connect(2), Some(Seat::Three));
    assert!(!session.is_started());
    assert_eq!(session.handle_connect(3), Some(Seat::Four));
    assert!(session.is_started());
    assert_eq!(session.acting_seat(), Seat::One);

    let script = [
        (HOST_CONNECTION, (1, 0), (2, 1), Seat::Two),
        (1, (4, 1), (3, 0), Seat::Three),
        (2, (1, 2), (2, 3), Seat::Four),
        (3, (4, 3), (3, 4), Seat::One),
    ];
    for (id, from, to, next) in script {
        assert_eq!(
            session.handle_move_intent(id, intent(from, to)),
            IntentOutcome::Applied,
            "{:?} -> {:?}",
            from,
            to
        );
        assert_eq!(session.acting_seat(), next);
        assert_eq!(session.snapshot().acting_seat(), Some(next));
    }
}

#[test]
fn test_partner_may_move_for_team() {
    let mut session = coordinator(SeatMode::Four);
    for id in 1..=3 {
        session.handle_connect(id);
    }
    // Seat 3 shares team A with the host.
    assert_eq!(
        session.handle_move_intent(2, intent((1, 0), (2, 1))),
        IntentOutcome::Applied
    );
}

#[test]
fn test_losing_team_b_pauses_match() {
    let mut session = coordinator(SeatMode::Two);
    session.handle_connect(1);
    session.handle_move_intent(HOST_CONNECTION, intent((1, 0), (2, 1)));
    take_sent(&mut session);

    session.handle_disconnect(1);
    assert!(!session.is_started());
    assert_eq!(session.seat_of(1), None);

    let sent = take_sent(&mut session);
    assert!(has_control(
        &sent,
        Route::Everyone,
        ControlSignal::WaitingForOpponent
    ));
    assert_eq!(
        session.handle_move_intent(HOST_CONNECTION, intent((1, 2), (2, 3))),
        IntentOutcome::NotAccepting
    );

    // A new opponent takes the freed seat and play resumes where it was.
    assert_eq!(session.handle_connect(5), Some(Seat::Two));
    assert!(session.is_started());
    assert_eq!(session.game().current_team(), Team::B);
    assert_eq!(
        session.game().board().get(Position::new(2, 1)),
        Some(PieceKind::Man(Team::A))
    );
}

#[test]
fn test_partner_leaving_keeps_four_seat_match_running() {
    let mut session = coordinator(SeatMode::Four);
    for id in 1..=3 {
        session.handle_connect(id);
    }
    session.handle_move_intent(HOST_CONNECTION, intent((1, 0), (2, 1)));
    assert_eq!(session.acting_seat(), Seat::Two);

    session.handle_disconnect(1);
    assert!(session.is_started());
    assert_eq!(session.acting_seat(), Seat::Four);
    assert_eq!(
        session.handle_move_intent(3, intent((4, 1), (3, 0))),
        IntentOutcome::Applied
    );
}

#[test]
fn test_spectator_leaving_is_quiet() {
    let mut session = coordinator(SeatMode::Two);
    session.handle_connect(1);
    session.handle_connect(2);
    take_sent(&mut session);

    session.handle_disconnect(2);
    assert!(session.is_started());
    assert!(take_sent(&mut session).is_empty());
}

#[test]
fn test_request_snapshot_is_directed() {
    let mut session = coordinator(SeatMode::Two);
    session.handle_connect(1);
    take_sent(&mut session);

    session.handle_message(1, PeerMessage::RequestSnapshot);
    let sent = take_sent(&mut session);
    assert_eq!(sent.len(), 1);
    assert!(matches!(sent[0], (Route::To(1), HostMessage::Snapshot(_))));
}

#[test]
fn test_restart_resets_and_starts() {
    let mut session = coordinator(SeatMode::Two);
    assert!(!session.is_started());
    take_sent(&mut session);

    session.restart();
    assert!(session.is_started());
    assert_eq!(session.game().current_team(), Team::A);
    assert_eq!(session.game().score_a(), 0);

    let sent = take_sent(&mut session);
    assert!(has_control(&sent, Route::Everyone, ControlSignal::MatchStarted));
    let Some((Route::Everyone, HostMessage::Snapshot(snapshot))) = sent.last() else {
        panic!("restart ends with a snapshot broadcast");
    };
    assert!(snapshot.is_started);
    assert!(!snapshot.is_over);

    assert_eq!(
        session.handle_move_intent(HOST_CONNECTION, intent((1, 0), (2, 1))),
        IntentOutcome::Applied
    );
}

#[test]
fn test_return_to_menu_reaches_everyone() {
    let mut session = coordinator(SeatMode::Two);
    session.handle_connect(1);
    take_sent(&mut session);

    session.handle_message(1, PeerMessage::RequestReturnToMenu);
    assert!(!session.is_started());
    let sent = take_sent(&mut session);
    assert!(has_control(&sent, Route::Everyone, ControlSignal::ReturnToMenu));
}

#[test]
fn test_blocked_board_ends_match() {
    // One man each on a 3x2 board: A at (0,1), B at (2,1).
    let config = SessionConfig::default().with_board(3, 2, 1);
    let mut session =
        SessionCoordinator::new(&config, RecordingOutbox::default()).expect("valid config");
    session.handle_connect(1);
    take_sent(&mut session);

    assert_eq!(
        session.handle_move_intent(HOST_CONNECTION, intent((0, 1), (1, 0))),
        IntentOutcome::Applied
    );
    assert!(session.game().is_over());
    assert_eq!(session.game().winner(), Some(Team::A));

    let sent = take_sent(&mut session);
    assert!(has_control(
        &sent,
        Route::Everyone,
        ControlSignal::MatchOver {
            winning_team: Team::A
        }
    ));
    assert!(session.snapshot().is_over);
    assert_eq!(
        session.handle_move_intent(1, intent((2, 1), (1, 0))),
        IntentOutcome::NotAccepting
    );
}
