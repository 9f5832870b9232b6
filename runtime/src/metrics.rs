//! Metric names emitted by the Store.
//!
//! The Store records through the `metrics` facade. Nothing is exported unless
//! the host application installs a recorder; call [`describe_metrics`] after
//! installing one so it can attach descriptions.

use metrics::{describe_counter, Unit};

/// Actions reduced, including actions fed back by effects
pub const ACTIONS_TOTAL: &str = "store.actions.total";

/// Effects executed, labelled by `type` (`none`, `sequential`, `future`)
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";

/// Actions rejected because the store was shutting down
pub const SHUTDOWN_REJECTED: &str = "store.shutdown.rejected_actions";

/// Register descriptions for every Store metric with the installed recorder
pub fn describe_metrics() {
    describe_counter!(ACTIONS_TOTAL, Unit::Count, "Actions reduced by the store");
    describe_counter!(EFFECTS_EXECUTED, Unit::Count, "Effects executed by the store");
    describe_counter!(
        SHUTDOWN_REJECTED,
        Unit::Count,
        "Actions rejected after shutdown began"
    );
}
