use thiserror::Error;

/// Failures raised inside the AMM kernel.
///
/// These never escape to the routing caller: the edge cost function catches
/// them and falls back to the edge's nominal rate, or marks the edge
/// unusable when no fallback exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmmError {
    /// Input consumes too much of the base reserve for the closed form to
    /// produce a meaningful quote.
    #[error("trade of {amount} against base reserve {reserve_base} is too large")]
    TradeTooLarge { amount: f64, reserve_base: f64 },

    /// One or both reserves are zero or negative.
    #[error("pool reserves must be positive (base={base}, quote={quote})")]
    NonPositiveReserve { base: f64, quote: f64 },

    /// The swap input amount is zero or negative.
    #[error("swap input must be positive, got {0}")]
    NonPositiveInput(f64),
}

/// Fatal graph-construction failures. None of these reach a solver: a graph
/// either builds completely or not at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("vertex {0} already exists")]
    DuplicateVertex(String),

    #[error("self-loop rejected on {0}")]
    SelfLoop(String),

    #[error("edge references unknown vertex {0}")]
    DanglingEdge(String),

    #[error("invalid pool on edge {edge}: {reason}")]
    InvalidPool { edge: String, reason: String },

    #[error("invalid bridge on edge {edge}: {reason}")]
    InvalidBridge { edge: String, reason: String },

    #[error("malformed graph document: {0}")]
    MalformedDocument(String),
}

/// Routing failures surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("source vertex {0} is not in the graph")]
    SourceNotFound(String),

    #[error("target vertex {0} is not in the graph")]
    TargetNotFound(String),

    #[error("no route from {from} to {target} within {max_hops} hops")]
    NoRoute {
        from: String,
        target: String,
        max_hops: u32,
    },
}
