//! Basic usage example for `SlotMap`.
//!
//! This example demonstrates how handles stay valid while records move around in the dense
//! storage, and how stale handles are detected after removal.

use slot_map::SlotMap;

#[derive(Clone, Copy, Debug)]
struct Sprite {
    x: i32,
    y: i32,
    frame: u8,
}

fn main() {
    let mut sprites = SlotMap::new();

    println!("Created SlotMap with capacity: {}", sprites.capacity());

    let player = sprites.insert(Sprite {
        x: 0,
        y: 0,
        frame: 0,
    });
    let tree = sprites.insert(Sprite {
        x: 10,
        y: 4,
        frame: 3,
    });
    let cloud = sprites.insert(Sprite {
        x: -5,
        y: 20,
        frame: 1,
    });

    println!("Inserted 3 sprites: {player}, {tree}, {cloud}");
    println!("Dense storage: {}", sprites.dump());

    // Handles give direct access to the records.
    sprites[player].x += 1;
    sprites.get_mut(cloud).frame = 2;

    // Bulk updates go over the dense storage as a plain slice.
    for sprite in sprites.values_mut() {
        sprite.y -= 1;
    }

    println!("After update: {}", sprites.dump().named("sprites"));

    // Removing the tree moves the cloud into its place, but the cloud's handle still works.
    println!(
        "Cloud at dense position {} before removing the tree",
        sprites.index_of(cloud)
    );

    let removed = sprites.remove(tree);
    println!("Removed tree: {removed:?}");

    println!(
        "Cloud at dense position {} after removing the tree",
        sprites.index_of(cloud)
    );
    println!("Cloud is still {:?}", sprites[cloud]);

    // The tree's handle is dead, even after its slot is reused.
    let bird = sprites.insert(Sprite {
        x: 3,
        y: 30,
        frame: 0,
    });

    println!("Bird reuses slot {} as {bird}", bird.index());
    println!("Tree handle {tree} still live: {}", sprites.contains(tree));

    match sprites.try_get(tree) {
        Ok(sprite) => println!("Unexpectedly found {sprite:?}"),
        Err(error) => println!("Looking up the tree fails: {error}"),
    }

    // Removing through a dead handle changes nothing.
    assert!(sprites.remove(tree).is_none());

    for (id, sprite) in &sprites {
        println!("{id}: {sprite:?}");
    }

    println!("Example completed successfully!");
}
