use std::time::Duration;

use labyrinth_core::{CellCoord, Command, Direction, EnemyId, Event};
use labyrinth_system_navigation::{AgentPhase, Navigation};
use labyrinth_system_pathfinding::{AStar, Path, PathPlanner};
use labyrinth_world::{self as world, grid::GridWorld, level::parse_level, query, World};

const STEP: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct CountingPlanner {
    inner: AStar,
    calls: usize,
}

impl PathPlanner for CountingPlanner {
    fn find_path(&mut self, start: CellCoord, goal: CellCoord, grid: &GridWorld) -> Path {
        self.calls += 1;
        self.inner.find_path(start, goal, grid)
    }
}

fn load(source: &str) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    let layout = parse_level(source).expect("valid level");
    world::apply(&mut world, Command::LoadLevel { layout }, &mut events);
    world
}

fn navigation() -> Navigation<CountingPlanner> {
    Navigation::with_planner(CountingPlanner::default())
}

fn run_tick<P: PathPlanner>(
    world: &mut World,
    navigation: &mut Navigation<P>,
    dt: Duration,
) -> Vec<Command> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);
    dispatch(world, navigation, &events)
}

fn dispatch<P: PathPlanner>(
    world: &mut World,
    navigation: &mut Navigation<P>,
    events: &[Event],
) -> Vec<Command> {
    let enemy_view = query::enemy_view(world);
    let mut commands = Vec::new();
    navigation.handle(
        events,
        &enemy_view,
        query::player_cell(world),
        query::grid_world(world),
        &mut commands,
    );

    let mut generated = Vec::new();
    for command in commands.iter().cloned() {
        world::apply(world, command, &mut generated);
    }
    commands
}

fn move_player(world: &mut World, direction: Direction) {
    let mut events = Vec::new();
    world::apply(world, Command::MovePlayer { direction }, &mut events);
    assert!(matches!(events.as_slice(), [Event::PlayerMoved { .. }]));
}

fn enemy_cell(world: &World, enemy: EnemyId) -> Option<CellCoord> {
    query::enemy_view(world)
        .iter()
        .find(|snapshot| snapshot.id == enemy)
        .map(|snapshot| snapshot.cell)
}

#[test]
fn emits_step_toward_player() {
    let mut world = load("XXXXXXX\nXEOOOPX\nXXXXXXX");
    let mut navigation = navigation();

    let commands = run_tick(&mut world, &mut navigation, STEP);

    assert_eq!(
        commands,
        vec![Command::StepEnemy {
            enemy: EnemyId::new(0),
            direction: Direction::East,
        }]
    );
    assert_eq!(enemy_cell(&world, EnemyId::new(0)), Some(CellCoord::new(2, 1)));
    assert_eq!(navigation.phase(EnemyId::new(0)), Some(AgentPhase::Moving));
}

#[test]
fn cached_route_is_reused_while_player_stands_still() {
    let mut world = load("XXXXXXX\nXEOOOPX\nXXXXXXX");
    let mut navigation = navigation();

    for _ in 0..3 {
        let commands = run_tick(&mut world, &mut navigation, STEP);
        assert_eq!(commands.len(), 1);
    }

    assert_eq!(navigation.planner().calls, 1);
    assert_eq!(navigation.search_count(EnemyId::new(0)), Some(1));
    assert_eq!(enemy_cell(&world, EnemyId::new(0)), Some(CellCoord::new(4, 1)));
    assert_eq!(
        navigation
            .cached_path(EnemyId::new(0))
            .map(|path| path.to_vec()),
        Some(vec![CellCoord::new(5, 1)])
    );
}

#[test]
fn player_movement_invalidates_cached_route() {
    let mut world = load("XXXXXXX\nXEOOOPX\nXXXXXXX");
    let mut navigation = navigation();

    let _ = run_tick(&mut world, &mut navigation, STEP);
    assert_eq!(navigation.planner().calls, 1);

    move_player(&mut world, Direction::West);
    let commands = run_tick(&mut world, &mut navigation, STEP);

    assert_eq!(navigation.planner().calls, 2);
    assert_eq!(
        commands,
        vec![Command::StepEnemy {
            enemy: EnemyId::new(0),
            direction: Direction::East,
        }]
    );
    assert_eq!(
        navigation
            .cached_path(EnemyId::new(0))
            .and_then(Path::last),
        Some(CellCoord::new(4, 1))
    );
}

#[test]
fn unreachable_player_is_searched_for_every_tick() {
    let mut world = load("XXXXXX\nXEXOPX\nXXXXXX");
    let mut navigation = navigation();

    for tick in 1..=3 {
        let commands = run_tick(&mut world, &mut navigation, STEP);
        assert!(commands.is_empty());
        assert_eq!(navigation.planner().calls, tick);
    }

    assert_eq!(navigation.phase(EnemyId::new(0)), Some(AgentPhase::Idle));
    assert_eq!(enemy_cell(&world, EnemyId::new(0)), Some(CellCoord::new(1, 1)));
}

#[test]
fn enemies_wait_for_accumulated_time() {
    let mut world = load("XXXXXXX\nXEOOOPX\nXXXXXXX");
    let mut navigation = navigation();
    let half = STEP / 2;

    assert!(run_tick(&mut world, &mut navigation, half).is_empty());
    assert_eq!(
        navigation.phase(EnemyId::new(0)),
        Some(AgentPhase::WaitingOnTimer)
    );
    assert_eq!(navigation.planner().calls, 0);

    assert_eq!(run_tick(&mut world, &mut navigation, half).len(), 1);
    assert_eq!(navigation.phase(EnemyId::new(0)), Some(AgentPhase::Moving));

    assert!(run_tick(&mut world, &mut navigation, half).is_empty());
    assert_eq!(
        navigation.phase(EnemyId::new(0)),
        Some(AgentPhase::PathCached)
    );
}

#[test]
fn at_most_one_step_per_enemy_per_batch() {
    let mut world = load("XXXXXXX\nXEOOOPX\nXXXXXXX");
    let mut navigation = navigation();
    let mut events = Vec::new();

    world::apply(&mut world, Command::Tick { dt: STEP }, &mut events);
    world::apply(&mut world, Command::Tick { dt: STEP }, &mut events);
    let commands = dispatch(&mut world, &mut navigation, &events);

    assert_eq!(commands.len(), 1);
    assert_eq!(enemy_cell(&world, EnemyId::new(0)), Some(CellCoord::new(2, 1)));
}

#[test]
fn enemies_are_planned_in_id_order() {
    let mut world = load("XXXXXXX\nXEOPOEX\nXXXXXXX");
    let mut navigation = navigation();

    let commands = run_tick(&mut world, &mut navigation, STEP);

    assert_eq!(
        commands,
        vec![
            Command::StepEnemy {
                enemy: EnemyId::new(0),
                direction: Direction::East,
            },
            Command::StepEnemy {
                enemy: EnemyId::new(1),
                direction: Direction::West,
            },
        ]
    );
    assert_eq!(navigation.agent_count(), 2);
}

#[test]
fn defeated_enemies_are_forgotten() {
    let mut world = load("XXXXXX\nXPEOOX\nXXXXXX");
    let mut navigation = navigation();

    let _ = run_tick(&mut world, &mut navigation, STEP);
    assert_eq!(enemy_cell(&world, EnemyId::new(0)), Some(CellCoord::new(1, 1)));
    assert_eq!(navigation.agent_count(), 1);

    let mut events = Vec::new();
    world::apply(&mut world, Command::Attack, &mut events);
    assert!(events.contains(&Event::EnemyDefeated {
        enemy: EnemyId::new(0),
        score: 1,
    }));

    let commands = dispatch(&mut world, &mut navigation, &events);
    assert!(commands.is_empty());
    assert_eq!(navigation.agent_count(), 0);
    assert_eq!(navigation.phase(EnemyId::new(0)), None);

    events.clear();
    world::apply(
        &mut world,
        Command::StepEnemy {
            enemy: EnemyId::new(0),
            direction: Direction::East,
        },
        &mut events,
    );
    assert!(events.is_empty(), "steps for removed enemies are ignored");
}

#[test]
fn level_reload_discards_every_agent() {
    let mut world = load("XXXXXXX\nXEOPOEX\nXXXXXXX");
    let mut navigation = navigation();
    let _ = run_tick(&mut world, &mut navigation, STEP);
    assert_eq!(navigation.agent_count(), 2);

    let mut events = Vec::new();
    let layout = parse_level("XXXXX\nXPOEX\nXXXXX").expect("valid level");
    world::apply(&mut world, Command::LoadLevel { layout }, &mut events);
    let commands = dispatch(&mut world, &mut navigation, &events);

    assert!(commands.is_empty());
    assert_eq!(navigation.agent_count(), 0);

    let commands = run_tick(&mut world, &mut navigation, STEP);
    assert_eq!(
        commands,
        vec![Command::StepEnemy {
            enemy: EnemyId::new(2),
            direction: Direction::West,
        }]
    );
    assert_eq!(navigation.search_count(EnemyId::new(2)), Some(1));
}
