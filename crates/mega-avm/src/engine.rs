//! The engine facade tying configuration, instrumentation and execution contexts together.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use tracing::debug;

use crate::{
    instrument, ConfigError, CostTable, EngineConfig, ExecutionContext, InstrumentError,
    InstrumentedMethod, Instruction, LayerId, LayeredState, MethodBody, StateBackend, StateError,
};

/// Errors raised while deploying or loading code.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The method body was rejected by instrumentation.
    #[error(transparent)]
    Instrument(#[from] InstrumentError),
    /// The state layer rejected the operation.
    #[error(transparent)]
    State(#[from] StateError),
    /// The code could not be encoded or decoded.
    #[error("code encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// The metered sandbox engine.
///
/// The cost table is built once from the configuration and shared read-only by every
/// instrumentation pass, so one engine can serve many threads.
#[derive(Clone, Debug)]
pub struct AvmEngine {
    config: EngineConfig,
    cost_table: Arc<CostTable>,
}

impl Default for AvmEngine {
    fn default() -> Self {
        Self { config: EngineConfig::default(), cost_table: Arc::new(CostTable::default()) }
    }
}

impl AvmEngine {
    /// Creates an engine, building the cost table from the configured schedule or the built-in
    /// one.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let cost_table = match &config.cost_schedule {
            Some(schedule) => CostTable::from_schedule(schedule)?,
            None => CostTable::default(),
        };
        debug!(target: "mega_avm::engine", priced_opcodes = cost_table.len(), "engine initialized");
        Ok(Self { config, cost_table: Arc::new(cost_table) })
    }

    /// Creates an engine from a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::new(EngineConfig::from_json(json)?)
    }

    /// The engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared cost table.
    pub const fn cost_table(&self) -> &Arc<CostTable> {
        &self.cost_table
    }

    /// Instruments a method body.
    pub fn instrument(&self, body: &MethodBody) -> Result<InstrumentedMethod, InstrumentError> {
        instrument(body, &self.cost_table)
    }

    /// Starts an execution with `energy_limit` available.
    pub fn new_execution(&self, energy_limit: u64) -> ExecutionContext {
        ExecutionContext::new(energy_limit, &self.config.watchdog)
    }

    /// Instruments `body` and stores it at `address`, together with its instrumented form.
    ///
    /// Nothing is written if instrumentation fails.
    pub fn deploy<B: StateBackend>(
        &self,
        state: &mut LayeredState<B>,
        layer: LayerId,
        address: Address,
        body: &MethodBody,
    ) -> Result<InstrumentedMethod, DeployError> {
        let instrumented = self.instrument(body)?;
        let code = Bytes::from(serde_json::to_vec(body)?);
        let transformed = Bytes::from(serde_json::to_vec(&instrumented.instructions)?);
        state.create_account(layer, address)?;
        state.put_code(layer, address, code)?;
        state.put_transformed_code(layer, address, transformed)?;
        Ok(instrumented)
    }

    /// Loads the instrumented code deployed at `address`.
    ///
    /// Falls back to instrumenting the deployed body when no instrumented form is cached, and
    /// caches the result in `layer`.
    pub fn load<B: StateBackend>(
        &self,
        state: &mut LayeredState<B>,
        layer: LayerId,
        address: Address,
    ) -> Result<Option<Vec<Instruction>>, DeployError> {
        if let Some(transformed) = state.transformed_code(layer, address)? {
            return Ok(Some(serde_json::from_slice(&transformed)?));
        }
        let Some(code) = state.code(layer, address)? else {
            return Ok(None);
        };
        let body: MethodBody = serde_json::from_slice(&code)?;
        let instrumented = self.instrument(&body)?;
        state.put_transformed_code(
            layer,
            address,
            Bytes::from(serde_json::to_vec(&instrumented.instructions)?),
        )?;
        Ok(Some(instrumented.instructions))
    }
}
