use std::time::Duration;

use glam::Vec2;
use labyrinth_core::{Display, EntityKind, Facing, GameStatus, PlayerInput};
use labyrinth_system_orchestrator::{
    campaign::Campaign, config::GameConfig, score_line, TickOrchestrator, GAME_OVER_MESSAGE,
    LEVEL_COMPLETED_MESSAGE, MESSAGE_POSITION, SCORE_POSITION, VICTORY_MESSAGE,
};
use labyrinth_world::query;

const FRAME: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct RecordingDisplay {
    pending_entities: Vec<(EntityKind, Vec2)>,
    pending_text: Vec<(Vec2, String)>,
    entities: Vec<(EntityKind, Vec2)>,
    text: Vec<(Vec2, String)>,
    frames: usize,
}

impl RecordingDisplay {
    fn count(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|(drawn, _)| *drawn == kind)
            .count()
    }

    fn has_text(&self, expected: &str) -> bool {
        self.text.iter().any(|(_, text)| text == expected)
    }
}

impl Display for RecordingDisplay {
    fn clear_layer(&mut self) {
        self.pending_entities.clear();
        self.pending_text.clear();
    }

    fn draw_entity(&mut self, kind: EntityKind, position: Vec2) {
        self.pending_entities.push((kind, position));
    }

    fn write_text(&mut self, position: Vec2, text: &str) {
        self.pending_text.push((position, text.to_owned()));
    }

    fn refresh_frame(&mut self) {
        self.entities = self.pending_entities.clone();
        self.text = self.pending_text.clone();
        self.frames += 1;
    }
}

fn session(levels: &[&str]) -> TickOrchestrator {
    let campaign = Campaign::from_sources(levels.iter().copied()).expect("valid levels");
    TickOrchestrator::new(GameConfig::default(), campaign).expect("valid session")
}

#[test]
fn invalid_config_is_rejected() {
    let campaign = Campaign::builtin().expect("built-in levels");
    let config = GameConfig {
        frame_interval_ms: 0,
        ..GameConfig::default()
    };

    assert!(TickOrchestrator::new(config, campaign).is_err());
}

#[test]
fn builtin_campaign_presents_first_level() {
    let campaign = Campaign::builtin().expect("built-in levels");
    let mut orchestrator =
        TickOrchestrator::new(GameConfig::default(), campaign).expect("valid session");
    let mut display = RecordingDisplay::default();

    let status = orchestrator.tick(Duration::from_millis(16), &[], &mut display);

    assert_eq!(status, GameStatus::Playing);
    assert_eq!(display.frames, 1);
    assert_eq!(display.count(EntityKind::Treasure), 5);
    assert_eq!(display.count(EntityKind::Enemy), 1);
    assert_eq!(display.count(EntityKind::Exit), 0, "exit starts hidden");
    assert_eq!(
        display.entities.last(),
        Some(&(
            EntityKind::Player {
                facing: Facing::Right,
                attacking: false,
            },
            Vec2::new(-303.0, 303.0),
        ))
    );
    assert_eq!(
        display.text,
        vec![(SCORE_POSITION, "Player Souls: 0".to_owned())]
    );
}

#[test]
fn treasure_pickup_updates_score_line() {
    let mut orchestrator = session(&["XXXXX\nXPTOX\nXXXXX"]);
    let mut display = RecordingDisplay::default();

    let _ = orchestrator.tick(FRAME, &[PlayerInput::MoveRight], &mut display);

    assert_eq!(orchestrator.score(), 10);
    assert!(display.has_text(&score_line(10)));
    assert_eq!(display.count(EntityKind::Treasure), 0);
    assert_eq!(display.count(EntityKind::Exit), 1, "exit revealed");
}

#[test]
fn enemy_contact_ends_the_session() {
    let mut orchestrator = session(&["XXXXXX\nXPOEOX\nXXXXXX"]);
    let mut display = RecordingDisplay::default();

    assert_eq!(orchestrator.tick(FRAME, &[], &mut display), GameStatus::Playing);
    assert_eq!(
        orchestrator.tick(FRAME, &[], &mut display),
        GameStatus::GameOver
    );
    assert!(display.has_text(GAME_OVER_MESSAGE));
    assert_eq!(display.count(EntityKind::Enemy), 1, "final scene stays visible");

    let ticks = query::tick_index(orchestrator.world());
    assert_eq!(
        orchestrator.tick(FRAME, &[PlayerInput::MoveLeft], &mut display),
        GameStatus::GameOver
    );
    assert_eq!(query::tick_index(orchestrator.world()), ticks);
    assert_eq!(display.frames, 3);
}

#[test]
fn attacking_an_enemy_on_the_same_cell_defeats_it() {
    let mut orchestrator = session(&["XXXXXXX\nXPEOOOX\nXXXXXXX"]);
    let mut display = RecordingDisplay::default();

    let status = orchestrator.tick(
        FRAME,
        &[PlayerInput::MoveRight, PlayerInput::Attack],
        &mut display,
    );

    assert_eq!(status, GameStatus::Playing);
    assert_eq!(orchestrator.score(), 1);
    assert_eq!(display.count(EntityKind::Enemy), 0);
    assert_eq!(orchestrator.navigation().agent_count(), 0);
    assert_eq!(
        display.count(EntityKind::Player {
            facing: Facing::Right,
            attacking: true,
        }),
        1
    );
}

#[test]
fn campaign_advances_through_levels_to_victory() {
    let level = "XXXXX\nXPTOX\nXXXXX";
    let mut orchestrator = session(&[level, level]);
    let mut display = RecordingDisplay::default();

    let _ = orchestrator.tick(FRAME, &[PlayerInput::MoveRight], &mut display);
    assert_eq!(orchestrator.score(), 10);
    let status = orchestrator.tick(FRAME, &[PlayerInput::MoveRight], &mut display);
    assert_eq!(status, GameStatus::Playing);
    assert_eq!(orchestrator.message(), Some(LEVEL_COMPLETED_MESSAGE));
    assert!(display.entities.is_empty(), "screen is cleared between levels");
    assert!(display.has_text(LEVEL_COMPLETED_MESSAGE));
    assert_eq!(orchestrator.level_index(), 0);

    let _ = orchestrator.tick(Duration::from_millis(1_500), &[], &mut display);
    assert_eq!(orchestrator.message(), Some(LEVEL_COMPLETED_MESSAGE));
    let _ = orchestrator.tick(Duration::from_millis(500), &[], &mut display);
    assert_eq!(orchestrator.message(), None);
    assert_eq!(orchestrator.level_index(), 1);
    assert_eq!(query::player_cell(orchestrator.world()).column(), 1);
    assert_eq!(display.count(EntityKind::Treasure), 1);

    let _ = orchestrator.tick(FRAME, &[PlayerInput::MoveRight], &mut display);
    let status = orchestrator.tick(FRAME, &[PlayerInput::MoveRight], &mut display);
    assert_eq!(status, GameStatus::Victory);
    assert_eq!(orchestrator.score(), 20, "score carries across levels");
    assert_eq!(
        display.text,
        vec![
            (MESSAGE_POSITION, VICTORY_MESSAGE.to_owned()),
            (SCORE_POSITION, score_line(20)),
        ]
    );
}
