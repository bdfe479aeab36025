use crate::error::{CoreError, Severity};

/// Emit a `CoreError` through tracing at the level matching its severity.
pub fn log_core_error(err: &CoreError) {
    let code = err.code();
    match err.severity {
        Severity::Info => tracing::info!(%code, "{err}"),
        Severity::Warn => tracing::warn!(%code, "{err}"),
        Severity::Error => tracing::error!(%code, "{err}"),
    }
}
