#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate entity id: {0}")]
    DuplicateEntity(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Lane assignment failed: {0}")]
    Lane(#[from] LaneCollision),
}

/// A move would place a chain on a lane already occupied in its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("chain {chain} collides on lane {lane}")]
pub struct LaneCollision {
    pub chain: usize,
    pub lane: i32,
}
