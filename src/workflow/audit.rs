use tracing::debug;

use crate::bus::{CommandBus, CATALOG};

/// Trace every catalog command at debug level.
pub(super) fn install(bus: &CommandBus) {
    for (name, _) in CATALOG {
        bus.subscribe(name, |command| {
            debug!(command = %command.name, payload = %command.payload, "Command");
            Ok(())
        });
    }
}
