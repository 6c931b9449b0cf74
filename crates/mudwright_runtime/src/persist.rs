//! Snapshot and account files.
//!
//! Worlds and accounts persist as self-describing JSON documents; object
//! references inside field values appear as `{"$ref": <identity>}` markers.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use mudwright_foundation::{Error, Result};
use mudwright_session::{Account, AccountStore};
use mudwright_world::Snapshot;

fn io_error(action: &str, path: &Path, source: &dyn std::fmt::Display) -> Error {
    Error::Io(format!("failed to {action} '{}': {source}", path.display()))
}

/// Saves a snapshot to a JSON file, creating or overwriting it.
///
/// # Errors
///
/// Returns an error if the file cannot be written or encoding fails.
pub fn save_snapshot<P: AsRef<Path>>(snapshot: &Snapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| io_error("create file", path, &e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshot)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| io_error("write file", path, &e))?;
    Ok(())
}

/// Loads a snapshot from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoding fails.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error("open file", path, &e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::Serialization(e.to_string()))
}

/// Saves every registered account to a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be written or encoding fails.
pub fn save_accounts<P: AsRef<Path>>(accounts: &AccountStore, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| io_error("create file", path, &e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &accounts.export())
        .map_err(|e| Error::Serialization(e.to_string()))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| io_error("write file", path, &e))?;
    Ok(())
}

/// Loads accounts from a JSON file into an empty store.
///
/// # Errors
///
/// Returns an error if the file cannot be read, decoding fails, or the
/// store already holds accounts.
pub fn load_accounts<P: AsRef<Path>>(accounts: &mut AccountStore, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error("open file", path, &e))?;
    let loaded: Vec<Account> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::Serialization(e.to_string()))?;
    accounts.import(loaded)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use mudwright_foundation::{ObjectId, Value};
    use mudwright_session::PlaintextHasher;
    use mudwright_world::library::{self, fields};
    use mudwright_world::{TraitRegistry, World};

    fn test_world() -> World {
        let mut registry = TraitRegistry::new();
        library::install(&mut registry).unwrap();
        let mut world = World::new(Arc::new(registry));
        let zone_arch = world.define_archetype("Zone", &["base", "zone"]).unwrap();
        let room_arch = world.define_archetype("Room", &["base", "room"]).unwrap();
        let zone = world
            .create(&zone_arch, &[(fields::NAME, "Docks".into())])
            .unwrap();
        world
            .create(
                &room_arch,
                &[(fields::NAME, "Pier".into()), (fields::ZONE, Value::Ref(zone))],
            )
            .unwrap();
        world
    }

    #[test]
    fn snapshot_file_roundtrip() {
        let world = test_world();
        let snapshot = world.snapshot();
        let path = std::env::temp_dir().join("mudwright_test_world.json");

        save_snapshot(&snapshot, &path).expect("save failed");
        let loaded = load_snapshot(&path).expect("load failed");
        assert_eq!(loaded, snapshot);

        let mut restored = World::new(Arc::clone(world.registry()));
        restored.restore(&loaded).expect("restore failed");
        assert_eq!(restored.len(), world.len());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn accounts_file_roundtrip() {
        let mut accounts = AccountStore::new(Box::new(PlaintextHasher));
        accounts
            .add_account("polly", "cracker", ObjectId::from_raw(2), true)
            .unwrap();
        let path = std::env::temp_dir().join("mudwright_test_accounts.json");

        save_accounts(&accounts, &path).expect("save failed");
        let mut loaded = AccountStore::new(Box::new(PlaintextHasher));
        load_accounts(&mut loaded, &path).expect("load failed");
        assert_eq!(loaded.export(), accounts.export());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_nonexistent_file_fails() {
        assert!(load_snapshot("/nonexistent/path/to/world.json").is_err());
    }
}
