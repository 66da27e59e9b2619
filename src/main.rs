//! Demo: propagate a small scene, raycast it and upload its geometry
//!
//! Usage: `scene_transform [scene.ron] [config.ron]`

use scene_transform::prelude::*;

/// Stand-in for a GPU: counts the bytes it is handed
struct GpuUploads<'w> {
    world: &'w SceneWorld,
    meshes: usize,
    bytes: usize,
}

fn demo_scene() -> Scene {
    let mut scene = Scene::new("Demo");
    let root = scene.add_node(SceneNode::named("root", Vec3::ZERO));
    let arm = scene.add_node(SceneNode::named("arm", Vec3::new(0.0, 0.0, -5.0)).with_parent(root));
    scene.add_node(
        SceneNode::named("hand", Vec3::new(0.0, 1.0, 0.0))
            .with_parent(arm)
            .with_cuboid(Vec3::splat(-0.5), Vec3::splat(0.5)),
    );
    scene.add_node(
        SceneNode::named("crate", Vec3::new(0.0, 0.0, -12.0))
            .with_parent(root)
            .with_cuboid(Vec3::splat(-1.0), Vec3::splat(1.0)),
    );
    scene
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let scene_path = args.next();
    let config = match args.next() {
        Some(path) => SceneConfig::load_ron(path)?,
        None => SceneConfig::default(),
    };
    config.init_logging();
    config.validate()?;

    let scene = match scene_path {
        Some(path) => Scene::load_ron(path)?,
        None => demo_scene(),
    };

    let (mut world, entities) = SceneWorld::from_scene(&scene, &config)?;
    let mut debug = DebugInfo::new();
    let moving = world.find("arm").or_else(|| entities.first().copied());

    for frame in 0..8 {
        // Only odd frames move anything; even frames should skip every node
        if frame % 2 == 1 {
            if let Some(mut node) = moving.and_then(|entity| world.local_mut(entity)) {
                node.local.rotate(Quat::from_rotation_y(0.1));
            }
        }

        let stats = world.propagate();
        log::info!("Frame {frame}: {}", stats.format_stats());
        debug.record_frame(stats);
    }
    log::info!(
        "Average recompute ratio over {} frames: {:.2}",
        debug.total_frames(),
        debug.avg_recompute_ratio()
    );

    let ray = Raycast::new(Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z));
    for hit in world.raycast(&ray) {
        let name = world.node_ref(hit.entity).name().map(|n| n.0.clone());
        log::info!(
            "Ray hit {} at distance {:.3}",
            name.as_deref().unwrap_or("<unnamed>"),
            hit.distance
        );
    }

    let mut scheduler: UploadScheduler<NodeRef<'_>, hecs::Entity, GpuUploads<'_>> =
        UploadScheduler::with_config(&config);
    scheduler.register(
        Some(Box::new(|item: &NodeRef<'_>, queue: &mut UploadQueue<hecs::Entity>| {
            let has_geometry = item.node().is_some_and(|node| node.geometry().is_some());
            if has_geometry {
                queue.push_unique(item.entity);
            }
            has_geometry
        })),
        Some(Box::new(|gpu: &mut GpuUploads<'_>, entity: &hecs::Entity| {
            let Ok(node) = gpu.world.inner.get::<&Node>(*entity) else {
                return false;
            };
            let (Some(geometry), Some(transform)) = (node.geometry(), node.world()) else {
                return false;
            };
            gpu.bytes += geometry.vertex_bytes().len() + transform.as_bytes().len();
            gpu.meshes += 1;
            true
        })),
    );
    for root in world.roots() {
        scheduler.add(&world.node_ref(root));
    }

    scheduler.upload(|| log::info!("All geometry uploaded"));
    let mut gpu = GpuUploads {
        world: &world,
        meshes: 0,
        bytes: 0,
    };
    let mut ticks = 0;
    while scheduler.is_active() {
        scheduler.tick(&mut gpu);
        ticks += 1;
    }
    log::info!(
        "Uploaded {} meshes ({} bytes) in {} ticks",
        gpu.meshes,
        gpu.bytes,
        ticks
    );

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Demo error: {}", e);
    }
}
