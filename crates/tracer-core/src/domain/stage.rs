//! Stage - 処理ステージ名と呼び出し経路（trail）
//!
//! trail は append-only です。下流ステージは上流の trail を引き継ぎ、
//! 自分のステージ名を末尾に追加した新しい trail を作ります（既存の trail は変更しない）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a processing stage (e.g. `RequestHandler`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageName(String);

impl StageName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StageName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordered record of the stages a trace has passed through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trail(Vec<StageName>);

impl Trail {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Trail of an envelope created at the origin of a trace.
    pub fn starting_at(stage: StageName) -> Self {
        Self(vec![stage])
    }

    /// Returns a new trail with `stage` appended; `self` is left as is.
    pub fn appended(&self, stage: StageName) -> Self {
        let mut stages = Vec::with_capacity(self.0.len() + 1);
        stages.extend(self.0.iter().cloned());
        stages.push(stage);
        Self(stages)
    }

    pub fn stages(&self) -> &[StageName] {
        &self.0
    }

    pub fn last(&self) -> Option<&StageName> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<StageName>> for Trail {
    fn from(stages: Vec<StageName>) -> Self {
        Self(stages)
    }
}

impl FromIterator<StageName> for Trail {
    fn from_iter<I: IntoIterator<Item = StageName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_serializes_as_list_of_strings() {
        let trail: Trail = ["RequestHandler", "Processor"]
            .into_iter()
            .map(StageName::from)
            .collect();

        let s = serde_json::to_string(&trail).unwrap();
        assert_eq!(s, r#"["RequestHandler","Processor"]"#);

        let back: Trail = serde_json::from_str(&s).unwrap();
        assert_eq!(back, trail);
    }

    #[test]
    fn appended_keeps_the_original_trail() {
        let origin = Trail::starting_at(StageName::new("RequestHandler"));
        let next = origin.appended(StageName::new("Processor"));

        assert_eq!(origin.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next.stages()[0], StageName::new("RequestHandler"));
        assert_eq!(next.last(), Some(&StageName::new("Processor")));
    }

    #[test]
    fn empty_trail() {
        let trail = Trail::new();
        assert!(trail.is_empty());
        assert_eq!(trail.last(), None);
        assert_eq!(serde_json::to_string(&trail).unwrap(), "[]");
    }
}
