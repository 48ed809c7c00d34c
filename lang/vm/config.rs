/// How a run gets its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoMode {
    /// Reads against an empty record suspend the run until a line arrives.
    #[default]
    Interactive,
    /// The whole input is entered before the run starts; reads never wait.
    Staged,
}

/// What a read does when the record is used up and the run must not wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExhaustedInput {
    #[default]
    Skip,
    PushZero,
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub ops_per_ms: u32,
    pub max_burst_multiplier: u32,
}

impl SchedulerConfig {
    pub const DEFAULT_OPS_PER_MS: u32 = 512;
    pub const DEFAULT_MAX_BURST_MULTIPLIER: u32 = 16;

    /// Upper bound of steps executed by one burst.
    pub fn max_burst(&self) -> u64 {
        self.ops_per_ms as u64 * self.max_burst_multiplier as u64
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            ops_per_ms: Self::DEFAULT_OPS_PER_MS,
            max_burst_multiplier: Self::DEFAULT_MAX_BURST_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PietConfig {
    pub exhausted_input: ExhaustedInput,
}
