use std::collections::BTreeMap;

/// Aggregate health as reported by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HealthSnapshot {
    pub status: String,
    pub components: BTreeMap<String, String>,
}

impl HealthSnapshot {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// State of the externally configured generation credential.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialStatus {
    pub active: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostics {
    pub documents_total: u64,
    pub documents_by_status: BTreeMap<String, u64>,
    pub any_processing: bool,
    pub credential: CredentialStatus,
}

/// Latest health and diagnostics snapshots. Read-only for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Monitor {
    health: Option<HealthSnapshot>,
    diagnostics: Option<Diagnostics>,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_health(&mut self, health: HealthSnapshot) -> bool {
        let changed = self.health.as_ref() != Some(&health);
        self.health = Some(health);
        changed
    }

    pub fn record_diagnostics(&mut self, diagnostics: Diagnostics) -> bool {
        let changed = self.diagnostics.as_ref() != Some(&diagnostics);
        self.diagnostics = Some(diagnostics);
        changed
    }

    pub fn health(&self) -> Option<&HealthSnapshot> {
        self.health.as_ref()
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    /// True when the last health pull reported anything but "ok".
    /// Unknown health is not treated as degraded.
    pub fn is_degraded(&self) -> bool {
        self.health.as_ref().is_some_and(|health| !health.is_ok())
    }

    pub fn credential(&self) -> Option<&CredentialStatus> {
        self.diagnostics.as_ref().map(|diag| &diag.credential)
    }
}
