#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lineseek::dataset::Dataset;
use lineseek::search::StrategyKind;

#[derive(Debug, Arbitrary)]
struct Input {
    lines: Vec<String>,
    query: String,
}

fuzz_target!(|input: Input| {
    // All strategies must agree with a plain scan
    let dataset = Dataset::from_lines(&input.lines);
    let expected = dataset.lines().iter().any(|l| **l == *input.query);
    for kind in StrategyKind::ALL {
        assert_eq!(kind.strategy().exists(&input.query, &dataset), expected, "{kind}");
    }
});
