/// Canonical serialization and hashing of game state.
///
/// The canonical form is compact UTF-8 JSON with the engine version bound
/// as the first field, struct fields in declaration order and all maps
/// sorted (BTreeMap). Two states with equal fields always hash equal, so
/// the hash doubles as a cheap optimistic-concurrency version tag.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::GameState;
use crate::ENGINE_VERSION;

/// Canonical UTF-8 JSON bytes of a state. No whitespace, deterministic
/// field order, absent options omitted entirely.
pub fn canonical_serialize(state: &GameState) -> Vec<u8> {
    let mut root = Map::new();
    root.insert(
        "engine_version".to_string(),
        Value::Number(ENGINE_VERSION.into()),
    );

    let fields = serde_json::to_value(state)
        .expect("canonical_serialize: state serialization failed");
    if let Value::Object(fields) = fields {
        for (key, value) in fields {
            root.insert(key, value);
        }
    }

    serde_json::to_string(&Value::Object(root))
        .expect("canonical_serialize: JSON encoding failed")
        .into_bytes()
}

/// SHA-256 of the canonical serialization, lowercase hex.
pub fn canonical_hash(state: &GameState) -> String {
    let digest = Sha256::digest(canonical_serialize(state));
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EngineConfig;
    use crate::state::create_initial_state;

    #[test]
    fn equal_states_hash_equal() {
        let config = EngineConfig::default();
        let a = create_initial_state("gs", "p1", "Acme", &config);
        let b = create_initial_state("gs", "p1", "Acme", &config);
        assert_eq!(canonical_hash(&a), canonical_hash(&b));
    }

    #[test]
    fn different_states_hash_different() {
        let config = EngineConfig::default();
        let a = create_initial_state("gs", "p1", "Acme", &config);
        let mut b = a.clone();
        b.reputation_points = 51.0;
        assert_ne!(canonical_hash(&a), canonical_hash(&b));
    }

    #[test]
    fn version_is_bound_first() {
        let config = EngineConfig::default();
        let state = create_initial_state("gs", "p1", "Acme", &config);
        let json = String::from_utf8(canonical_serialize(&state)).unwrap();
        assert!(json.starts_with("{\"engine_version\":1,"));
    }
}
