//! Exact-match search strategies.
//!
//! Every strategy answers the same question, whether `query` is one of the
//! dataset's lines (exact, case-sensitive, whole line), and must agree with
//! every other strategy on the answer. They differ in which lookup structure
//! of the [`Dataset`] they use:
//!
//! | Strategy | Structure | Lookup |
//! |----------|-----------|--------|
//! | [`LinearSearch`] | file order | O(n) |
//! | [`BinarySearch`] | sorted view | O(log n) |
//! | [`JumpSearch`] | sorted view | O(√n) |
//! | [`ExponentialSearch`] | sorted view | O(log n) |
//! | [`SetSearch`] | hash set | O(1) average |
//!
//! Sorted views and hash sets are built once per snapshot (see
//! [`Dataset::sorted`] and [`Dataset::membership`]), never per lookup.

pub mod binary;
pub mod exponential;
pub mod jump;
pub mod linear;
pub mod set;

pub use binary::BinarySearch;
pub use exponential::ExponentialSearch;
pub use jump::JumpSearch;
pub use linear::LinearSearch;
pub use set::SetSearch;

use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An exact-match predicate over a dataset snapshot
pub trait SearchStrategy: Send + Sync {
    /// Short name used in logs and configuration
    fn name(&self) -> &'static str;

    /// Build whatever lookup structure the strategy needs ahead of the first query
    fn prepare(&self, _dataset: &Dataset) {}

    /// Whether `query` is exactly one of the dataset's lines
    fn exists(&self, query: &str, dataset: &Dataset) -> bool;
}

/// Selectable strategy, as written in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Linear,
    Binary,
    Jump,
    Exponential,
    #[default]
    Set,
}

impl StrategyKind {
    /// Every selectable strategy
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Linear,
        StrategyKind::Binary,
        StrategyKind::Jump,
        StrategyKind::Exponential,
        StrategyKind::Set,
    ];

    /// The strategy implementation for this kind
    pub fn strategy(self) -> &'static dyn SearchStrategy {
        match self {
            StrategyKind::Linear => &LinearSearch,
            StrategyKind::Binary => &BinarySearch,
            StrategyKind::Jump => &JumpSearch,
            StrategyKind::Exponential => &ExponentialSearch,
            StrategyKind::Set => &SetSearch,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_lines([
            "20;0;11;21;0;18;3;0;",
            "3;0;1;28;0;7;5;0;",
            "apple",
            "Apple",
            "banana",
            "zebra",
            "10;0;1;26;0;8;3;0;",
            "mango",
            "apple",
        ])
    }

    #[test]
    fn test_all_strategies_find_every_line() {
        let ds = sample();
        for kind in StrategyKind::ALL {
            for line in ds.lines() {
                assert!(
                    kind.strategy().exists(line, &ds),
                    "{kind} missed {line:?}"
                );
            }
        }
    }

    #[test]
    fn test_all_strategies_reject_absent() {
        let ds = sample();
        let absent = [
            "does-not-exist",
            "APPLE",
            "appl",
            "apple ",
            "20;0;11;21;0;18;3;0",
            "",
            "0",
            "zzzz",
            "AAA",
        ];
        for kind in StrategyKind::ALL {
            for q in absent {
                assert!(!kind.strategy().exists(q, &ds), "{kind} found {q:?}");
            }
        }
    }

    #[test]
    fn test_strategies_agree_on_generated_data() {
        let lines: Vec<String> = (0..1000)
            .map(|i| format!("{};{};{}", (i * 7919) % 1013, i % 17, i % 3))
            .collect();
        let ds = Dataset::from_lines(&lines);

        for i in 0..1500 {
            let q = format!("{};{};{}", (i * 7919) % 1013, i % 17, i % 3);
            let expected = lines.contains(&q);
            for kind in StrategyKind::ALL {
                assert_eq!(kind.strategy().exists(&q, &ds), expected, "{kind} on {q:?}");
            }
        }
    }

    #[test]
    fn test_all_strategies_on_empty_dataset() {
        let ds = Dataset::default();
        for kind in StrategyKind::ALL {
            assert!(!kind.strategy().exists("anything", &ds), "{kind}");
        }
    }

    #[test]
    fn test_all_strategies_on_single_line() {
        let ds = Dataset::from_lines(["only"]);
        for kind in StrategyKind::ALL {
            assert!(kind.strategy().exists("only", &ds), "{kind}");
            assert!(!kind.strategy().exists("a", &ds), "{kind}");
            assert!(!kind.strategy().exists("z", &ds), "{kind}");
        }
    }

    #[test]
    fn test_strategy_kind_serde_names() {
        let kind: StrategyKind = serde_json::from_str("\"exponential\"").unwrap();
        assert_eq!(kind, StrategyKind::Exponential);
        assert_eq!(serde_json::to_string(&StrategyKind::Set).unwrap(), "\"set\"");
        assert_eq!(StrategyKind::default(), StrategyKind::Set);
        assert_eq!(StrategyKind::Jump.to_string(), "jump");
    }
}
