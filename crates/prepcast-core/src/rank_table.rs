//! Score-to-rank domain tables.
//!
//! A table is a list of `(score threshold, rank)` pairs, highest score first.
//! Lookup returns the rank of the greatest threshold not above the score, so
//! rank never improves as score drops. Tables are validated once, when the
//! engine is built.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One row of a rank table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub score: u16,
    pub rank: u32,
}

/// Score-to-rank mapping for a single exam year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    pub year: u16,
    /// Rank reported for scores below the smallest threshold.
    pub fallback_rank: u32,
    /// Sorted by score, highest first.
    pub entries: Vec<RankEntry>,
}

impl RankTable {
    /// Build a table, rejecting any ordering violation.
    pub fn new(
        year: u16,
        fallback_rank: u32,
        entries: Vec<RankEntry>,
    ) -> Result<Self, ConfigError> {
        let table = Self {
            year,
            fallback_rank,
            entries,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: String| ConfigError::RankTable {
            year: self.year,
            reason,
        };

        let Some(first) = self.entries.first() else {
            return Err(fail("table has no entries".into()));
        };
        if first.rank < 1 {
            return Err(fail("ranks start at 1".into()));
        }

        for pair in self.entries.windows(2) {
            let (higher, lower) = (pair[0], pair[1]);
            if lower.score >= higher.score {
                return Err(fail(format!(
                    "thresholds must strictly descend ({} then {})",
                    higher.score, lower.score
                )));
            }
            if lower.rank <= higher.rank {
                return Err(fail(format!(
                    "rank must strictly grow as score drops ({} at {}, {} at {})",
                    higher.rank, higher.score, lower.rank, lower.score
                )));
            }
        }

        if let Some(last) = self.entries.last() {
            if self.fallback_rank <= last.rank {
                return Err(fail(format!(
                    "fallback rank {} must be worse than last rank {}",
                    self.fallback_rank, last.rank
                )));
            }
        }

        Ok(())
    }

    /// Rank for a score: the entry with the greatest threshold `<= score`.
    ///
    /// Scores above the top threshold map to rank 1; scores below the
    /// bottom threshold map to `fallback_rank`.
    pub fn rank_for(&self, score: u16) -> u32 {
        match self.entries.first() {
            Some(top) if score > top.score => return 1,
            None => return self.fallback_rank,
            _ => {}
        }

        // Entries descend, so the first threshold <= score is the greatest one.
        let idx = self.entries.partition_point(|entry| entry.score > score);
        self.entries
            .get(idx)
            .map(|entry| entry.rank)
            .unwrap_or(self.fallback_rank)
    }

    /// Built-in table for the 2025 exam cycle.
    pub fn builtin_2025() -> Self {
        const ROWS: &[(u16, u32)] = &[
            (720, 1),
            (715, 20),
            (710, 150),
            (700, 500),
            (690, 1_500),
            (680, 3_000),
            (670, 6_000),
            (660, 12_000),
            (650, 20_000),
            (640, 30_000),
            (620, 50_000),
            (600, 80_000),
            (580, 115_000),
            (550, 170_000),
            (500, 280_000),
            (450, 480_000),
            (400, 1_200_000),
            (350, 3_400_000),
        ];

        Self {
            year: 2025,
            fallback_rank: 3_500_000,
            entries: ROWS
                .iter()
                .map(|&(score, rank)| RankEntry { score, rank })
                .collect(),
        }
    }
}

/// Validated rank tables keyed by exam year.
#[derive(Debug, Clone, PartialEq)]
pub struct RankTableSet {
    /// Sorted by year, never empty.
    tables: Vec<RankTable>,
}

impl RankTableSet {
    pub fn new(mut tables: Vec<RankTable>) -> Result<Self, ConfigError> {
        if tables.is_empty() {
            return Err(ConfigError::NoRankTables);
        }
        for table in &tables {
            table.validate()?;
        }

        tables.sort_by_key(|table| table.year);
        if let Some(pair) = tables.windows(2).find(|pair| pair[0].year == pair[1].year) {
            return Err(ConfigError::DuplicateYear(pair[0].year));
        }

        Ok(Self { tables })
    }

    /// Years with a configured table, ascending.
    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.tables.iter().map(|table| table.year)
    }

    /// Pick the table for an exam year.
    ///
    /// Without a year, the latest table wins. An unknown year falls back to
    /// the latest table at or before it, else the earliest table.
    pub fn select(&self, year: Option<u16>) -> &RankTable {
        let idx = match year {
            Some(y) => self
                .tables
                .partition_point(|table| table.year <= y)
                .saturating_sub(1),
            None => self.tables.len() - 1,
        };
        &self.tables[idx]
    }
}

impl Default for RankTableSet {
    fn default() -> Self {
        Self {
            tables: vec![RankTable::builtin_2025()],
        }
    }
}
