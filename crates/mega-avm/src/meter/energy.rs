use tracing::debug;

use crate::FatalSignal;

/// The energy budget of one execution.
///
/// Besides the remaining budget the meter holds the latched forced exit of the execution, which
/// [`charge`](Self::charge) re-raises before doing anything else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnergyMeter {
    limit: u64,
    remaining: u64,
    forced_exit: Option<FatalSignal>,
}

impl EnergyMeter {
    /// Creates a meter with the full `limit` available.
    pub const fn new(limit: u64) -> Self {
        Self { limit, remaining: limit, forced_exit: None }
    }

    /// Charges `cost` against the remaining energy.
    ///
    /// # Returns
    ///
    /// The latched signal if there is one. Otherwise, when `cost` exceeds the remaining energy,
    /// the budget is drained and [`FatalSignal::OutOfEnergy`] is latched and returned.
    pub fn charge(&mut self, cost: u64) -> Result<(), FatalSignal> {
        if let Some(signal) = self.forced_exit {
            return Err(signal);
        }
        match self.remaining.checked_sub(cost) {
            Some(remaining) => {
                self.remaining = remaining;
                Ok(())
            }
            None => {
                let signal = FatalSignal::OutOfEnergy { cost, remaining: self.remaining };
                self.remaining = 0;
                Err(self.latch(signal))
            }
        }
    }

    /// Latches `signal` unless another signal is already latched, and returns the latched one.
    pub fn latch(&mut self, signal: FatalSignal) -> FatalSignal {
        *self.forced_exit.get_or_insert_with(|| {
            debug!(target: "mega_avm::meter", %signal, "latched forced exit");
            signal
        })
    }

    /// The latched signal, if any.
    pub const fn forced_exit(&self) -> Option<FatalSignal> {
        self.forced_exit
    }

    /// The energy limit the meter started with.
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// The energy left.
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// The energy charged so far. Equals the limit once the budget ran out.
    pub const fn used(&self) -> u64 {
        self.limit - self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_within_budget() {
        let mut meter = EnergyMeter::new(100);
        meter.charge(40).unwrap();
        meter.charge(60).unwrap();
        assert_eq!(meter.remaining(), 0);
        assert_eq!(meter.used(), 100);
        assert_eq!(meter.forced_exit(), None);
    }

    #[test]
    fn test_exhaustion_latches_and_drains() {
        let mut meter = EnergyMeter::new(100);
        meter.charge(40).unwrap();
        meter.charge(40).unwrap();
        let signal = meter.charge(40).unwrap_err();
        assert_eq!(signal, FatalSignal::OutOfEnergy { cost: 40, remaining: 20 });
        assert_eq!(meter.used(), 100);
        // Even a free checkpoint re-raises the latched signal.
        assert_eq!(meter.charge(0), Err(signal));
    }

    #[test]
    fn test_first_latched_signal_wins() {
        let mut meter = EnergyMeter::new(10);
        assert_eq!(meter.latch(FatalSignal::Aborted), FatalSignal::Aborted);
        let overflow = FatalSignal::OutOfStack { depth: 1, size: 1 };
        assert_eq!(meter.latch(overflow), FatalSignal::Aborted);
        assert_eq!(meter.charge(1), Err(FatalSignal::Aborted));
        assert_eq!(meter.remaining(), 10);
    }
}
