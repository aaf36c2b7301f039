use std::collections::HashMap;

use thiserror::Error;

use super::codec::Codec;
use super::scope::{Claim, ProtocolId, Scope};

/// Registry construction failure. Fatal at startup: a registry that fails to
/// build must prevent the pipeline from becoming ready.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("codec '{incoming}' claims {claim}, already claimed by '{existing}'")]
    RegistrationConflict {
        claim: Claim,
        existing: &'static str,
        incoming: &'static str,
    },
    #[error("codec '{codec}' claims identifier in unrecognized scope '{scope}'")]
    UnknownScope { scope: Scope, codec: &'static str },
}

/// Accumulates codecs before the one-time registry build.
///
/// This is the dynamic registration surface; the static compiled-in list is
/// [`crate::codecs::default_codecs`].
pub struct RegistryBuilder {
    codecs: Vec<Box<dyn Codec>>,
    recognized: Vec<Scope>,
}

impl RegistryBuilder {
    /// Builder recognizing every scope.
    pub fn new() -> Self {
        Self::with_scopes(&Scope::ALL)
    }

    /// Builder recognizing only `scopes`; registering a codec that claims an
    /// identifier outside them fails with [`RegistryError::UnknownScope`].
    /// This is the startup knob for disabling a whole namespace, e.g.
    /// UDP-port tunnel sniffing.
    pub fn with_scopes(scopes: &[Scope]) -> Self {
        RegistryBuilder {
            codecs: Vec::new(),
            recognized: scopes.to_vec(),
        }
    }

    pub fn register(mut self, codec: Box<dyn Codec>) -> Self {
        self.codecs.push(codec);
        self
    }

    pub fn register_all(mut self, codecs: impl IntoIterator<Item = Box<dyn Codec>>) -> Self {
        self.codecs.extend(codecs);
        self
    }

    /// Validate every claim and freeze the lookup table.
    pub fn build(self) -> Result<CodecRegistry, RegistryError> {
        let mut table: HashMap<(Scope, ProtocolId), usize> = HashMap::new();
        for (index, codec) in self.codecs.iter().enumerate() {
            for claim in codec.claims() {
                if !self.recognized.contains(&claim.scope) {
                    return Err(RegistryError::UnknownScope {
                        scope: claim.scope,
                        codec: codec.name(),
                    });
                }
                if let Some(&existing) = table.get(&(claim.scope, claim.id)) {
                    return Err(RegistryError::RegistrationConflict {
                        claim,
                        existing: self.codecs[existing].name(),
                        incoming: codec.name(),
                    });
                }
                table.insert((claim.scope, claim.id), index);
            }
        }
        Ok(CodecRegistry {
            codecs: self.codecs,
            table,
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide codec table, built exactly once and immutable afterwards.
///
/// Lookups are plain `HashMap` reads with no interior mutability, so a
/// `&CodecRegistry` is freely shared across decode threads.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn Codec>>,
    table: HashMap<(Scope, ProtocolId), usize>,
}

impl CodecRegistry {
    /// Registry populated with the full compiled-in codec set.
    pub fn with_default_codecs() -> Result<Self, RegistryError> {
        RegistryBuilder::new()
            .register_all(crate::codecs::default_codecs())
            .build()
    }

    /// Find the codec claiming `id` within `scope`.
    ///
    /// `None` means no registered codec handles the identifier; the
    /// dispatcher treats that as a clean stop, not an error.
    pub fn lookup(&self, scope: Scope, id: ProtocolId) -> Option<&dyn Codec> {
        self.table
            .get(&(scope, id))
            .map(|&index| self.codecs[index].as_ref())
    }

    /// Number of registered codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.codecs.iter().map(|c| c.name()).collect::<Vec<_>>())
            .field("entries", &self.table.len())
            .finish()
    }
}
