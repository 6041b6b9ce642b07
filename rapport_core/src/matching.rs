use log::{debug, warn};

use std::fmt::Display;

use crate::config::BenchmarkRow;
use crate::ReportErrors;

/// Canonical form of a unit identifier: trimmed, upper-cased, and with every run
/// of whitespace collapsed to a single space.
///
/// ```
/// use rapport_core::normalize;
/// assert_eq!(normalize("  Ru   i\t"), "RU I");
/// ```
pub fn normalize(identifier: &str) -> String {
    identifier
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Same as [`normalize`], for a possibly missing identifier. A missing identifier
/// normalizes to the empty string.
pub fn normalize_opt(identifier: Option<&str>) -> String {
    identifier.map(normalize).unwrap_or_default()
}

/// Which rule of the resolver picked the benchmark row.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum MatchTier {
    /// Same normalized identifier.
    Exact,
    /// One normalized identifier contains the other.
    Fuzzy,
    /// The row carrying the fallback label.
    FallbackLabel,
    /// Nothing matched: the first row of the table.
    FirstRow,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub tier: MatchTier,
    pub row: &'a BenchmarkRow,
}

/// Finds the benchmark row for a unit identifier.
///
/// The rules are tried in order and the first one that matches wins:
/// 1. a row with the same normalized identifier
/// 2. scanning rows in table order, the first row whose normalized identifier
///    contains the normalized target or is contained in it
/// 3. the first row whose normalized identifier contains `fallback_label`
/// 4. the first row of the table
///
/// Fails only when the table is empty.
pub fn resolve<'a>(
    target: &str,
    rows: &'a [BenchmarkRow],
    fallback_label: &str,
) -> Result<Resolution<'a>, ReportErrors> {
    let first = rows.first().ok_or(ReportErrors::NoBenchmarkData)?;
    let target_n = normalize(target);

    if let Some(row) = rows.iter().find(|r| r.normalized == target_n) {
        debug!("resolve: exact match for {:?}", target_n);
        return Ok(Resolution {
            tier: MatchTier::Exact,
            row,
        });
    }

    // Several rows may qualify here. The first one in table order is taken.
    if let Some(row) = rows
        .iter()
        .find(|r| r.normalized.contains(&target_n) || target_n.contains(&r.normalized))
    {
        warn!(
            "resolve: no exact match for {:?}, using fuzzy match {:?}",
            target, row.identifier
        );
        return Ok(Resolution {
            tier: MatchTier::Fuzzy,
            row,
        });
    }

    let label_n = normalize(fallback_label);
    if let Some(row) = rows.iter().find(|r| r.normalized.contains(&label_n)) {
        warn!(
            "resolve: no match for {:?}, using fallback benchmark {:?}",
            target, row.identifier
        );
        return Ok(Resolution {
            tier: MatchTier::FallbackLabel,
            row,
        });
    }

    warn!(
        "resolve: no match for {:?} and no {:?} row, using the first benchmark row {:?}",
        target, fallback_label, first.identifier
    );
    Ok(Resolution {
        tier: MatchTier::FirstRow,
        row: first,
    })
}

/// A notice for the user that the benchmark was not found by exact match.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Advisory {
    /// Which benchmark table ("evidence" or "survei").
    pub table: &'static str,
    pub target: String,
    pub tier: MatchTier,
    pub chosen: String,
}

impl Advisory {
    /// An advisory for every tier other than an exact match.
    pub fn for_resolution(table: &'static str, target: &str, res: &Resolution) -> Option<Advisory> {
        match res.tier {
            MatchTier::Exact => None,
            tier => Some(Advisory {
                table,
                target: target.to_string(),
                tier,
                chosen: res.row.identifier.clone(),
            }),
        }
    }
}

impl Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tier {
            MatchTier::Exact => write!(
                f,
                "Benchmark {}: '{}' ditemukan untuk HSH '{}'",
                self.table, self.chosen, self.target
            ),
            MatchTier::Fuzzy => write!(
                f,
                "HSH '{}' tidak ditemukan exact match di benchmark {}. Ditemukan match: '{}'",
                self.target, self.table, self.chosen
            ),
            MatchTier::FallbackLabel => write!(
                f,
                "Data benchmark {} untuk HSH '{}' tidak ditemukan. Menggunakan benchmark '{}' sebagai referensi.",
                self.table, self.target, self.chosen
            ),
            MatchTier::FirstRow => write!(
                f,
                "Data benchmark {} untuk HSH '{}' tidak ditemukan. Menggunakan benchmark: '{}'",
                self.table, self.target, self.chosen
            ),
        }
    }
}
