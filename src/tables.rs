use std::time::Instant;

use log::debug;

use crate::attacks::AttackTable;
use crate::config::TableConfig;
use crate::error::Result;
use crate::masks::EvaluationMasks;
use crate::zobrist::ZobristKeys;

/// Everything precomputed once per process: attack lookups, hash keys and
/// evaluation masks. Boards and searches borrow it.
#[derive(Clone)]
pub struct Tables {
    pub attacks: AttackTable,
    pub keys: ZobristKeys,
    pub masks: EvaluationMasks,
}

impl Tables {
    pub fn new(config: &TableConfig) -> Result<Self> {
        let start = Instant::now();
        let attacks = AttackTable::build(config)?;
        let tables = Self::from_parts(attacks, ZobristKeys::new(config.zobrist_seed))?;
        debug!("Tables initialised in {:?}", start.elapsed());
        Ok(tables)
    }

    /// Assemble tables from already-built parts, checking the hash keys.
    pub fn from_parts(attacks: AttackTable, keys: ZobristKeys) -> Result<Self> {
        keys.validate()?;
        Ok(Tables {
            attacks,
            keys,
            masks: EvaluationMasks::new(),
        })
    }
}

/// Tables shared by every unit test, built on first use
#[cfg(test)]
pub(crate) fn test_tables() -> &'static Tables {
    use once_cell::sync::Lazy;

    static TABLES: Lazy<Tables> =
        Lazy::new(|| Tables::new(&TableConfig::default()).expect("default tables build"));
    &TABLES
}
