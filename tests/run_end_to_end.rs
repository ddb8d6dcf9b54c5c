use clap::Parser;
use dilemma_core::world::World;
use dilemma_io::CheckpointPersistence;
use dilemma_lib::app::{App, RunOutcome, ShutdownManager};
use dilemma_lib::cli::Args;

#[test]
fn test_run_writes_stats_examples_and_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let stats = dir.path().join("stats.tsv");
    let examples = dir.path().join("ex-");
    let ckpt = dir.path().join("run.ckpt");

    let args = Args::try_parse_from([
        "dilemma",
        "--size",
        "6x6",
        "--states",
        "3",
        "--turns",
        "5",
        "--steps",
        "6",
        "--play-area",
        "1",
        "--kill-area",
        "1",
        "--cross-area",
        "1",
        "--seed",
        "21",
        "--stat-file",
        stats.to_str().unwrap(),
        "--stat-report-rate",
        "2",
        "--example-name",
        examples.to_str().unwrap(),
        "--example-rate",
        "3",
        "--checkpoint",
        ckpt.to_str().unwrap(),
        "--backup-rate",
        "4",
    ])
    .unwrap();

    let world = args.build_world().unwrap();
    let mut app = App::new(world, args.checkpoint.clone(), ShutdownManager::new()).unwrap();
    assert_eq!(app.run().unwrap(), RunOutcome::Completed { steps: 6 });
    drop(app);

    let text = std::fs::read_to_string(&stats).unwrap();
    let steps: Vec<u64> = text
        .lines()
        .map(|line| line.split('\t').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(steps, vec![0, 2, 4]);

    for step in [0, 3] {
        let path = format!("{}{step}.gv", examples.display());
        let dot = std::fs::read_to_string(&path).unwrap();
        assert!(dot.starts_with("digraph automaton {"), "{path}");
    }

    let saved = World::load(&ckpt).unwrap();
    assert_eq!(saved.step_count(), 6);
    assert_eq!(saved.settings().turn_n, 5);
}

#[test]
fn test_resumed_run_matches_uninterrupted_run() {
    let dir = tempfile::tempdir().unwrap();
    let ckpt = dir.path().join("run.ckpt");
    let ckpt_arg = ckpt.to_str().unwrap();
    let common = ["dilemma", "--size", "5x5", "--states", "3", "--turns", "4", "--seed", "8"];

    let straight = Args::try_parse_from(common.iter().copied().chain(["--steps", "8"])).unwrap();
    let mut app = App::new(straight.build_world().unwrap(), None, ShutdownManager::new()).unwrap();
    app.run().unwrap();
    let reference = app.into_world();

    let first = Args::try_parse_from(
        common
            .iter()
            .copied()
            .chain(["--steps", "3", "--checkpoint", ckpt_arg]),
    )
    .unwrap();
    let mut app = App::new(first.build_world().unwrap(), first.checkpoint.clone(), ShutdownManager::new()).unwrap();
    app.run().unwrap();

    let second =
        Args::try_parse_from(["dilemma", "--resume", "--checkpoint", ckpt_arg, "--steps", "8"]).unwrap();
    let mut app = App::new(second.build_world().unwrap(), None, ShutdownManager::new()).unwrap();
    assert_eq!(app.run().unwrap(), RunOutcome::Completed { steps: 5 });
    let resumed = app.into_world();

    assert_eq!(resumed.step_count(), 8);
    assert_eq!(resumed.rng(), reference.rng());
    assert_eq!(resumed.cells(), reference.cells());
}

#[test]
fn test_interrupted_run_leaves_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let ckpt = dir.path().join("run.ckpt");
    let args = Args::try_parse_from([
        "dilemma",
        "--size",
        "4x4",
        "--steps",
        "0",
        "--checkpoint",
        ckpt.to_str().unwrap(),
    ])
    .unwrap();

    let shutdown = ShutdownManager::new();
    shutdown.request_shutdown();
    let mut app = App::new(args.build_world().unwrap(), args.checkpoint.clone(), shutdown).unwrap();
    assert_eq!(app.run().unwrap(), RunOutcome::Interrupted { steps: 0 });
    assert!(ckpt.exists());
}
