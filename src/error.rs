use super::contract::ContractStatus;

/// Failures raised by contract formation and the lifecycle engine.
///
/// Business-rule violations are never retried. Infrastructure failures are
/// carried unchanged in [`StoreError`].
#[derive(thiserror::Error, Debug)]
pub enum ContractError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ContractError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
    pub fn cannot_accept(status: ContractStatus) -> Self {
        Self::InvalidState(format!(
            "Contract cannot be accepted. Current status: {status}"
        ))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{0} is not set")]
    MissingIdentifier(&'static str),
    #[error("commodity name is blank")]
    BlankCommodity,
    #[error("commodity name exceeds {max} characters (got {len})")]
    CommodityTooLong { len: usize, max: usize },
    #[error("{field} exceeds {max} characters (got {len})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("buyer and seller are the same party")]
    SelfDealing,
    #[error("phone number is blank")]
    BlankPhoneNumber,
}

#[derive(thiserror::Error, Debug)]
pub enum IdentifierError {
    #[error("invalid identifier prefix: {0}")]
    Prefix(#[from] bech32::primitives::hrp::Error),
    #[error("failed to encode identifier: {0}")]
    Encode(#[from] bech32::EncodeError),
}

/// Persistence and encoding failures, propagated as-is.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] minicbor::encode::Error<std::convert::Infallible>),
    #[error("failed to decode record: {0}")]
    Decode(#[from] minicbor::decode::Error),
    #[error("failed to canonicalise parameters: {0}")]
    Canonical(#[from] serde_json::Error),
}

impl From<sled::Error> for ContractError {
    fn from(value: sled::Error) -> Self {
        StoreError::from(value).into()
    }
}
impl From<minicbor::encode::Error<std::convert::Infallible>> for ContractError {
    fn from(value: minicbor::encode::Error<std::convert::Infallible>) -> Self {
        StoreError::from(value).into()
    }
}
impl From<minicbor::decode::Error> for ContractError {
    fn from(value: minicbor::decode::Error) -> Self {
        StoreError::from(value).into()
    }
}
impl From<serde_json::Error> for ContractError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::from(value).into()
    }
}
