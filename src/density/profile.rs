/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Lightweight call-count and cumulative-time profiler

use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::{Duration, Instant};

/// Accumulated timing of one profiled section
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SectionStats {
    /// Number of timed calls
    pub calls: usize,
    /// Total time spent in the section
    pub cumulative: Duration,
}

/// Records how often named sections run and how long they take
#[derive(Debug)]
pub struct Profiler {
    started: Instant,
    sections: BTreeMap<&'static str, SectionStats>,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    /// Start a new profiler
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            sections: BTreeMap::new(),
        }
    }

    /// Run `f`, adding its duration to the section `name`
    pub fn time<T>(&mut self, name: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        let entry = self.sections.entry(name).or_default();
        entry.calls += 1;
        entry.cumulative += start.elapsed();
        result
    }

    /// Stats of a section, if it ran
    pub fn section(&self, name: &str) -> Option<SectionStats> {
        self.sections.get(name).copied()
    }

    /// Report of all sections, sorted by cumulative time
    pub fn report(&self) -> String {
        let mut sections: Vec<_> = self.sections.iter().collect();
        sections.sort_by(|a, b| b.1.cumulative.cmp(&a.1.cumulative));

        let mut out = String::new();
        let _ = writeln!(
            out,
            "profile over {:.3} s\n{:>10} {:>12} {:>12}  section",
            self.started.elapsed().as_secs_f64(),
            "ncalls",
            "cumtime",
            "percall"
        );
        for (name, stats) in sections {
            let cumulative = stats.cumulative.as_secs_f64();
            let per_call = if stats.calls > 0 {
                cumulative / stats.calls as f64
            } else {
                0.0
            };
            let _ = writeln!(
                out,
                "{:>10} {:>12.6} {:>12.6}  {}",
                stats.calls, cumulative, per_call, name
            );
        }
        out
    }
}
