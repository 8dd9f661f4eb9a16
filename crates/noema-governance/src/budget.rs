use noema_config::ProcessTypeDefaults;
use noema_core::ResourceAllocation;

use crate::tier::TierPolicy;

/// Compute the resource allocation for an accepted process: the
/// pointwise minimum of the tier ceiling and the process type's
/// configured default. A pure policy lookup: same inputs, same
/// allocation, no state.
///
/// Access flags stay conservative: network only when the type default
/// explicitly grants it, tool access limited to the type's allow-list.
pub fn allocate(policy: &TierPolicy, defaults: &ProcessTypeDefaults) -> ResourceAllocation {
    ResourceAllocation {
        compute_pct: policy.max_resource_pct.min(defaults.compute_pct),
        time_budget_secs: policy.max_duration_secs.min(defaults.time_budget_secs),
        memory_ceiling_mb: policy.max_memory_mb.min(defaults.memory_ceiling_mb),
        network_access: defaults.network_access,
        tool_allowlist: defaults.tool_allowlist.clone(),
    }
}
