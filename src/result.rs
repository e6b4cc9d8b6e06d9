//! The `AnomalyResult` record and its line-delimited JSON serialization (C9).

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::error::EngineError;

/// Two mappings from feature name to the ordered list of time instants at which that feature
/// is an anomaly. A feature with no anomalies of a kind does not appear as a key at all (§6).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AnomalyResult {
    pub dead_features: BTreeMap<String, Vec<i64>>,
    pub false_optionals: BTreeMap<String, Vec<i64>>,
}

impl AnomalyResult {
    pub fn record_dead(&mut self, feature: &str, t: i64) {
        self.dead_features
            .entry(feature.to_owned())
            .or_default()
            .push(t);
    }

    pub fn record_false_optional(&mut self, feature: &str, t: i64) {
        self.false_optionals
            .entry(feature.to_owned())
            .or_default()
            .push(t);
    }

    /// Writes the result as a single line of JSON, `\n`-terminated, per §6.
    pub fn write_to(&self, out: &mut impl Write) -> Result<(), EngineError> {
        serde_json::to_writer(&mut *out, self)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_features_with_no_anomalies() {
        let mut result = AnomalyResult::default();
        result.record_dead("a", 0);

        let mut buf = Vec::new();
        result.write_to(&mut buf).unwrap();

        let line = String::from_utf8(buf).unwrap();
        assert_eq!(line, "{\"dead_features\":{\"a\":[0]},\"false_optionals\":{}}\n");
    }

    #[test]
    fn accumulates_multiple_instants_in_order() {
        let mut result = AnomalyResult::default();
        result.record_dead("a", 0);
        result.record_dead("a", 2);

        assert_eq!(result.dead_features["a"], vec![0, 2]);
    }
}
