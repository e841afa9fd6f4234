use crate::domain::entities::ParamKind;
use crate::domain::errors::{CliError, Warning};
use crate::domain::value_objects::ParamMap;

/// Outcome of folding every occurrence of a repeatable argument
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Merged {
    pub params: ParamMap,
    /// One entry per overwritten key, in the order the overrides happened
    pub warnings: Vec<Warning>,
}

/// Folds repeated `-H`/`-Q` occurrences into a single map.
///
/// Keys are trimmed and lower-cased, values trimmed. A later occurrence of a
/// key replaces the earlier one and records a [`Warning::DuplicateKey`].
pub struct ParamMerger {
    kind: ParamKind,
}

impl ParamMerger {
    pub fn new(kind: ParamKind) -> Self {
        Self { kind }
    }

    pub fn headers() -> Self {
        Self::new(ParamKind::Header)
    }

    pub fn queries() -> Self {
        Self::new(ParamKind::Query)
    }

    /// Returns `None` when the argument never appeared on the command line.
    pub fn merge(&self, raw: Option<&[String]>) -> Result<Option<Merged>, CliError> {
        let Some(occurrences) = raw else {
            return Ok(None);
        };

        let mut merged = Merged::default();
        for occurrence in occurrences {
            for pair in occurrence.split(self.kind.pair_separator()) {
                let pair = pair.trim();
                if pair.is_empty() {
                    continue;
                }
                let (key, value) = self.split_pair(pair)?;
                if merged.params.insert(key.clone(), value).is_some() {
                    tracing::debug!(kind = %self.kind, key = %key, "overriding earlier value");
                    merged.warnings.push(Warning::DuplicateKey {
                        kind: self.kind,
                        key,
                    });
                }
            }
        }
        Ok(Some(merged))
    }

    fn split_pair(&self, pair: &str) -> Result<(String, String), CliError> {
        let delimiter = self.kind.key_delimiter();
        let (key, value) = pair
            .split_once(delimiter)
            .ok_or_else(|| CliError::MalformedArgument {
                kind: self.kind,
                pair: pair.to_string(),
                delimiter,
            })?;
        Ok((key.trim().to_lowercase(), value.trim().to_string()))
    }
}
