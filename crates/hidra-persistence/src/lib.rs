// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
Save and load a [`World`] as JSON (spec §9: persistence is a snapshot, not a
live handle). `World` itself cannot be serialized directly — it embeds an
`EventQueue` (a mutex and an atomic counter) and a `SpatialHash`, neither of
which implement `Serialize` — so this crate round-trips through
[`WorldSnapshot`], the plain-data DTO `hidra-world` builds for exactly this
purpose.
*/

use std::path::Path;

use hidra_world::{World, WorldError, WorldSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to (de)serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot could not be reconstructed into a world: {0}")]
    World(#[from] WorldError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Serializes `world`'s current state to a pretty-printed JSON string.
pub fn save_to_string(world: &World) -> PersistenceResult<String> {
    let snapshot = world.to_snapshot();
    let json_str = serde_json::to_string_pretty(&snapshot)?;
    Ok(json_str)
}

/// Reconstructs a [`World`] from a JSON string previously produced by
/// [`save_to_string`]. The genome is recompiled from the snapshot's source
/// text; Genesis is not re-run, since the snapshot's neurons already reflect
/// whatever genesis/gestation/mitosis/apoptosis activity produced them.
pub fn load_from_string(json_str: &str) -> PersistenceResult<World> {
    let snapshot: WorldSnapshot = serde_json::from_str(json_str)?;
    let world = World::from_snapshot(snapshot)?;
    Ok(world)
}

/// Saves `world` to `path` as pretty-printed JSON.
pub fn save_to_file<P: AsRef<Path>>(world: &World, path: P) -> PersistenceResult<()> {
    let json_str = save_to_string(world)?;
    std::fs::write(path.as_ref(), json_str)?;
    tracing::debug!(path = %path.as_ref().display(), tick = world.current_tick, "saved world snapshot");
    Ok(())
}

/// Loads a world previously saved with [`save_to_file`].
pub fn load_from_file<P: AsRef<Path>>(path: P) -> PersistenceResult<World> {
    let json_str = std::fs::read_to_string(path.as_ref())?;
    let world = load_from_string(&json_str)?;
    tracing::debug!(path = %path.as_ref().display(), tick = world.current_tick, "loaded world snapshot");
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidra_config::Config;

    fn sample_world() -> World {
        World::new("", Config::default()).expect("empty genome compiles to a valid, neuron-less world")
    }

    #[test]
    fn round_trips_through_string() {
        let world = sample_world();
        let json_str = save_to_string(&world).unwrap();
        let restored = load_from_string(&json_str).unwrap();
        assert_eq!(restored.current_tick, world.current_tick);
        assert_eq!(restored.neuron_count(), world.neuron_count());
    }

    #[test]
    fn round_trips_through_file() {
        let mut world = sample_world();
        world.run_for(5);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        save_to_file(&world, &path).unwrap();
        let restored = load_from_file(&path).unwrap();

        assert_eq!(restored.current_tick, world.current_tick);
    }

    #[test]
    fn rejects_malformed_json() {
        let result = load_from_string("not json");
        assert!(matches!(result, Err(PersistenceError::Json(_))));
    }
}
