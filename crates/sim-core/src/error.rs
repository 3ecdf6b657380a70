use thiserror::Error;

/// Recoverable failures returned by simulation operations.
///
/// Every variant means "nothing changed"; callers decide whether to retry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A debit was refused because the ledger holds less than requested.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: i64, available: i64 },
    /// No property, employee, customer, event or goal with this id.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
    /// A roster, store or event capacity is full.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),
    /// A random roll went against the player (e.g. an unreliable delivery).
    #[error("stochastic failure: {0}")]
    StochasticFailure(String),
    /// The target exists but is not in a state that allows the operation.
    #[error("not eligible: {0}")]
    Ineligible(String),
    /// A scripted predicate failed to compile or evaluate.
    #[error("script error: {0}")]
    Script(String),
}

impl SimError {
    pub fn unknown(what: impl Into<String>) -> Self {
        SimError::UnknownEntity(what.into())
    }

    pub fn ineligible(why: impl Into<String>) -> Self {
        SimError::Ineligible(why.into())
    }

    /// True for failures that come from a random roll rather than bad input.
    pub fn is_stochastic(&self) -> bool {
        matches!(self, SimError::StochasticFailure(_))
    }
}

/// Result alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Validation errors for seed catalogs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price, rent, reward or cost must be non-negative.
    #[error("negative monetary value in {0}")]
    NegativeMoney(String),
    /// Probability field outside [0, 1].
    #[error("probability out of range in {0}")]
    InvalidProbability(String),
    /// Numeric field must be finite.
    #[error("non-finite numeric value in {0}")]
    NonFinite(String),
    /// Two templates share an id.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    /// Names and ids must not be blank.
    #[error("empty name or id")]
    EmptyName,
    /// A multiplier or duration must be strictly positive.
    #[error("value must be > 0 in {0}")]
    NonPositive(String),
    /// A rate or level above its allowed ceiling.
    #[error("value out of range in {0}")]
    OutOfRange(String),
}
