mod common;

use common::WorldBuilder;
use dilemma_core::world::World;
use dilemma_data::Status;

/// 6x3 torus, kill area 1, every row scored by column as `scores`.
fn striped(scores: [i64; 6]) -> World {
    WorldBuilder::new()
        .with_size(6, 3)
        .with_config(|s| s.kill_area = 1)
        .with_cells(move |cells| {
            for (i, cell) in cells.iter_mut().enumerate() {
                cell.score = scores[i % 6];
                cell.lifetime = 10;
            }
        })
        .build()
}

fn statuses(world: &World) -> Vec<Vec<Status>> {
    (0..world.height())
        .map(|y| (0..world.width()).map(|x| world.cell(x, y).status).collect())
        .collect()
}

#[test]
fn test_kill_pass_is_order_sensitive() {
    let mut world = striped([5, 1, 4, 0, 3, 2]);
    assert_eq!(world.select_weak(), 3);

    use Status::{Dead as D, Survived as S};
    // (0,0) first turns Strong, then (1,0) dies and re-marks it Survived.
    // The remaining local minima in rows 1 and 2 were shielded before their
    // turn came.
    assert_eq!(
        statuses(&world),
        vec![
            vec![S, D, S, D, S, D],
            vec![S, S, S, S, S, S],
            vec![S, S, S, S, S, S],
        ]
    );

    assert_eq!(world.retire_old(), 0);
    assert_eq!(world.spawn(), 3);
    for x in [1, 3, 5] {
        assert_eq!(world.cell(x, 0).status, Status::Alive);
    }
}

#[test]
fn test_flat_scores_kill_only_the_first_cell() {
    let mut world = WorldBuilder::new()
        .with_size(3, 3)
        .with_cells(|cells| {
            for cell in cells.iter_mut() {
                cell.score = 7;
            }
        })
        .build();
    // Every cell is a local minimum, but the first death shields the board.
    assert_eq!(world.select_weak(), 1);
    assert_eq!(world.cell(0, 0).status, Status::Dead);
    assert_eq!(
        world.cells().iter().filter(|c| c.status == Status::Survived).count(),
        8
    );
}

#[test]
fn test_only_strong_cells_retire() {
    let mut world = WorldBuilder::new()
        .with_size(5, 5)
        .with_cells(|cells| {
            for (i, cell) in cells.iter_mut().enumerate() {
                cell.score = i as i64;
                cell.lifetime = if i == 6 || i == 18 { 0 } else { 3 };
            }
        })
        .build();
    world.select_weak();
    // (1,1) was shielded by the dying origin, (3,3) was Strong.
    assert_eq!(world.cell(1, 1).status, Status::Survived);
    assert_eq!(world.cell(3, 3).status, Status::Strong);

    assert_eq!(world.retire_old(), 1);
    assert_eq!(world.cell(3, 3).status, Status::Dead);
    assert_eq!(world.cell(2, 2).status, Status::Survived);
    assert_eq!(world.cell(1, 1).status, Status::Survived);
}
