//! Tunables for the in-process runtime. Plain struct of constants, not a
//! dynamic config file — there is nothing here an operator needs to reload
//! without a restart.

/// Runtime-wide tunables for the arbiter and its stores.
#[derive(Clone, Copy, Debug)]
pub struct ArbiterConfig {
    /// Per-session broadcast channel capacity. Slow subscribers that fall
    /// this far behind miss events rather than blocking publishers.
    pub change_channel_capacity: usize,
    /// Byte length (before hex-encoding) of a newly generated claim/bearer
    /// secret.
    pub secret_bytes: usize,
    /// Byte length (before hex-encoding) of a newly generated session id.
    pub session_id_bytes: usize,
    /// Byte length (before hex-encoding) of a newly generated agent id.
    pub agent_id_bytes: usize,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            change_channel_capacity: 32,
            secret_bytes: 32,
            session_id_bytes: 12,
            agent_id_bytes: 12,
        }
    }
}
