use crate::HealthRes;

/// Liveness check served at `/health`.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static health check; the registry has no background state to probe.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Letter registry is alive".into(),
        }
    }
}
