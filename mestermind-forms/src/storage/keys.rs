/// Bumped whenever the meaning of a stored value changes, so stale entries
/// written by an older engine are never read back.
pub const KEY_SCHEMA_VERSION: u32 = 1;

/// Logical entries the engine keeps in the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Id of the draft being filled for a service, question set and place
    DraftPointer {
        service_id: i64,
        question_set_id: Option<i64>,
        place_id: Option<i64>,
    },
    /// Set once a request has been submitted, read by the hosting page
    Submitted { service_id: i64, place_id: Option<i64> },
    /// Return destination of a submission deferred until sign-in
    PendingSubmission { service_id: i64, place_id: Option<i64> },
}

impl StoreKey {
    pub fn draft(service_id: i64, question_set_id: Option<i64>, place_id: Option<i64>) -> Self {
        StoreKey::DraftPointer {
            service_id,
            question_set_id,
            place_id,
        }
    }

    pub fn submitted(service_id: i64, place_id: Option<i64>) -> Self {
        StoreKey::Submitted {
            service_id,
            place_id,
        }
    }

    pub fn pending_submission(service_id: i64, place_id: Option<i64>) -> Self {
        StoreKey::PendingSubmission {
            service_id,
            place_id,
        }
    }
}

/// Renders [`StoreKey`]s as `{namespace}:v{version}:{kind}:{ids..}` strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new("mestermind")
    }
}

impl KeySpace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn render(&self, key: &StoreKey) -> String {
        let prefix = format!("{}:v{}", self.namespace, KEY_SCHEMA_VERSION);
        match key {
            StoreKey::DraftPointer {
                service_id,
                question_set_id,
                place_id,
            } => format!(
                "{prefix}:draft:{service_id}:{}:{}",
                id_segment(*question_set_id),
                id_segment(*place_id)
            ),
            StoreKey::Submitted {
                service_id,
                place_id,
            } => format!("{prefix}:submitted:{service_id}:{}", id_segment(*place_id)),
            StoreKey::PendingSubmission {
                service_id,
                place_id,
            } => format!(
                "{prefix}:pending-submit:{service_id}:{}",
                id_segment(*place_id)
            ),
        }
    }
}

fn id_segment(id: Option<i64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string())
}
