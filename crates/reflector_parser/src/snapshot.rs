//! Graph snapshots in `MessagePack` format.
//!
//! A snapshot is the handoff to a code generator: the populated graph and
//! the source units its types came from.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use reflector_foundation::{Error, Result};
use reflector_model::{SourceUnit, TypeGraph};
use serde::{Deserialize, Serialize};

use crate::session::Session;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    graph: &'a TypeGraph,
    units: &'a [SourceUnit],
}

/// A deserialized snapshot.
#[derive(Clone, Debug, Deserialize)]
pub struct Snapshot {
    /// The type graph.
    pub graph: TypeGraph,
    /// Source units, indexed by `UnitId`.
    pub units: Vec<SourceUnit>,
}

/// Serializes the session's graph and units to bytes.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(session: &Session) -> Result<Vec<u8>> {
    let snapshot = SnapshotRef {
        graph: session.graph(),
        units: session.units(),
    };
    rmp_serde::to_vec_named(&snapshot).map_err(|e| Error::serialization(e.to_string()))
}

/// Deserializes a snapshot from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<Snapshot> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::serialization(e.to_string()))
}

/// Writes a snapshot of the session to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(session: &Session, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        Error::serialization(format!("failed to create file '{}': {e}", path.display()))
    })?;
    let mut writer = BufWriter::new(file);
    let bytes = to_bytes(session)?;
    writer
        .write_all(&bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| Error::serialization(format!("failed to write to file '{}': {e}", path.display())))?;
    log::debug!(target: "reflector", "wrote snapshot of {} types to {}", session.graph().len(), path.display());
    Ok(())
}

/// Loads a snapshot from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::serialization(format!("failed to open file '{}': {e}", path.display())))?;
    let mut bytes = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .map_err(|e| Error::serialization(format!("failed to read file '{}': {e}", path.display())))?;
    from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflector_foundation::ParserConfig;

    const HEADER: &str = "#include \"Pickup.generated.h\"\n\
        USTRUCT(BlueprintType)\nstruct FPickup\n{\n\tGENERATED_BODY()\n\
        \tUPROPERTY(EditAnywhere, BlueprintReadWrite)\n\tint32 Amount;\n};\n";

    fn parsed_session() -> Session {
        let mut session = Session::new(ParserConfig::default());
        let unit = session.add_unit("Game/Pickup.h", "Game", HEADER);
        assert!(crate::resolver::parse_module(&mut session, &[unit]).is_success());
        session
    }

    #[test]
    fn roundtrip_bytes() {
        let session = parsed_session();
        let bytes = to_bytes(&session).expect("serialization failed");
        let snapshot = from_bytes(&bytes).expect("deserialization failed");

        assert_eq!(snapshot.graph.len(), session.graph().len());
        assert_eq!(snapshot.units.len(), 1);
        let id = snapshot.graph.find_global("FPickup").unwrap();
        let body = snapshot.graph.node(id).body().unwrap();
        assert_eq!(body.properties[0].name, "Amount");
    }

    #[test]
    fn roundtrip_file() {
        let session = parsed_session();
        let path = std::env::temp_dir().join(format!("reflector_snapshot_{}.msgpack", std::process::id()));
        save_to_file(&session, &path).unwrap();
        let snapshot = load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(snapshot.graph.find_global("FPickup").is_some());
    }

    #[test]
    fn garbage_is_rejected() {
        let err = from_bytes(&[0xc1, 0x00]).unwrap_err();
        assert!(err.to_string().starts_with("serialization error"));
    }
}
