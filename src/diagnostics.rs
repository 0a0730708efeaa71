// Diagnostics - non-fatal warnings raised while building and diffing tables
//
// Adapters and the cross-check engine never print. They report through a
// `WarningSink` handed in by the caller, so warnings can be logged, collected
// in tests, or shared between per-node workers.

use std::fmt;
#[cfg(test)]
use std::sync::Mutex;

/// A recoverable oddity found in a state table or while matching entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A key expected to hold one element held several; the first one was used
    MultipleValues { key: String, detail: String },
    /// CLI protocol code with no long name
    UnknownProtocol { code: String },
    /// Several neighbor entries share the queried address
    AmbiguousNeighbor { address: String, candidates: usize },
    /// Several route entries share the destination and no next-hop told them apart
    AmbiguousRoute { destination: String, candidates: usize },
    /// A `via` continuation line appeared before any route entry
    OrphanContinuation { line_no: usize, line: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MultipleValues { key, detail } => {
                write!(f, "multiple {}: {}", key, detail)
            }
            Warning::UnknownProtocol { code } => write!(f, "unknown protocol: {}", code),
            Warning::AmbiguousNeighbor {
                address,
                candidates,
            } => write!(
                f,
                "found {} candidate ospf-neighbor entries for {}, using the first",
                candidates, address
            ),
            Warning::AmbiguousRoute {
                destination,
                candidates,
            } => write!(
                f,
                "no next-hop disambiguates {} candidate route entries for {}, using the first",
                candidates, destination
            ),
            Warning::OrphanContinuation { line_no, line } => {
                write!(f, "line {}: next-hop without a route entry: {}", line_no, line.trim())
            }
        }
    }
}

/// Receiver for warnings
pub trait WarningSink: Send + Sync {
    fn warn(&self, warning: Warning);
}

/// Sink that forwards warnings to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, warning: Warning) {
        tracing::warn!("{}", warning);
    }
}

/// Sink that keeps every warning in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<Warning>>,
}

#[cfg(test)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings
            .lock()
            .map(|w| w.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.warnings().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
impl WarningSink for CollectingSink {
    fn warn(&self, warning: Warning) {
        match self.warnings.lock() {
            Ok(mut warnings) => warnings.push(warning),
            Err(poisoned) => poisoned.into_inner().push(warning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        sink.warn(Warning::UnknownProtocol { code: "D".to_string() });
        sink.warn(Warning::AmbiguousNeighbor {
            address: "192.0.2.1".to_string(),
            candidates: 2,
        });

        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0], Warning::UnknownProtocol { code: "D".to_string() });
    }

    #[test]
    fn test_warning_display() {
        let w = Warning::MultipleValues {
            key: "rt-entry".to_string(),
            detail: "[...]".to_string(),
        };
        assert_eq!(w.to_string(), "multiple rt-entry: [...]");
    }
}
