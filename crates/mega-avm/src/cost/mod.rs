//! # Opcode cost table
//!
//! The cost table maps every chargeable opcode to a fixed energy fee. It is built once when the
//! engine starts, either from the built-in schedule or from a configured [`CostSchedule`], and
//! is shared read-only by all instrumentation passes afterwards.
//!
//! The static fee of an opcode is
//!
//! ```text
//! static_fee = energy_level + MEMORY_LEVEL * max(push_count - pop_count, 0)
//! ```
//!
//! so opcodes that grow the operand stack pay for the memory they claim.

use alloy_primitives::map::HashMap;
use serde::{Deserialize, Serialize};

use crate::{constants::energy::MEMORY_LEVEL, ConfigError, Opcode};

mod schedule;
pub use schedule::*;

/// The fee of a single opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CostEntry {
    /// The opcode this entry prices.
    pub opcode: Opcode,
    /// The base energy level of the opcode.
    pub energy_level: u64,
    /// The number of operand stack slots the opcode consumes.
    pub stack_pop_count: u8,
    /// The number of operand stack slots the opcode produces.
    pub stack_push_count: u8,
    /// The fee charged for executing the opcode once.
    pub static_fee: u64,
}

impl CostEntry {
    /// Creates an entry, deriving its static fee. Returns `None` if the fee overflows `u64`.
    pub const fn new(opcode: Opcode, energy_level: u64, pop: u8, push: u8) -> Option<Self> {
        let growth = push.saturating_sub(pop) as u64;
        let static_fee = match MEMORY_LEVEL.checked_mul(growth) {
            Some(memory) => energy_level.checked_add(memory),
            None => None,
        };
        match static_fee {
            Some(static_fee) => Some(Self {
                opcode,
                energy_level,
                stack_pop_count: pop,
                stack_push_count: push,
                static_fee,
            }),
            None => None,
        }
    }
}

/// One row of a configured cost schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// The opcode being priced.
    pub opcode: Opcode,
    /// The base energy level.
    pub energy_level: u64,
    /// Operand stack slots consumed.
    pub pop: u8,
    /// Operand stack slots produced.
    pub push: u8,
}

/// A list of opcode prices, as read from configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostSchedule(pub Vec<ScheduleEntry>);

impl CostSchedule {
    /// The built-in schedule.
    pub fn builtin() -> Self {
        Self(
            DEFAULT_SCHEDULE
                .iter()
                .map(|&(opcode, energy_level, pop, push)| ScheduleEntry {
                    opcode,
                    energy_level,
                    pop,
                    push,
                })
                .collect(),
        )
    }
}

/// The immutable opcode-to-fee mapping.
#[derive(Clone, Debug)]
pub struct CostTable {
    entries: HashMap<Opcode, CostEntry>,
}

impl Default for CostTable {
    fn default() -> Self {
        Self::from_schedule(&CostSchedule::builtin())
            .expect("the built-in cost schedule has no duplicate opcodes")
    }
}

impl CostTable {
    /// Builds the table from a schedule. Every opcode may be priced at most once.
    pub fn from_schedule(schedule: &CostSchedule) -> Result<Self, ConfigError> {
        let mut entries = HashMap::default();
        for row in &schedule.0 {
            let entry = CostEntry::new(row.opcode, row.energy_level, row.pop, row.push)
                .ok_or(ConfigError::CostOverflow(row.opcode))?;
            if entries.insert(row.opcode, entry).is_some() {
                return Err(ConfigError::DuplicateCostEntry(row.opcode));
            }
        }
        Ok(Self { entries })
    }

    /// Returns the entry for `opcode`, if the opcode is chargeable.
    #[inline]
    pub fn get(&self, opcode: Opcode) -> Option<&CostEntry> {
        self.entries.get(&opcode)
    }

    /// Returns the static fee of `opcode`, if the opcode is chargeable.
    #[inline]
    pub fn static_fee(&self, opcode: Opcode) -> Option<u64> {
        self.get(opcode).map(|entry| entry.static_fee)
    }

    /// The number of priced opcodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table prices no opcode at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
