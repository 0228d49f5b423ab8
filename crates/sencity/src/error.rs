use thiserror::Error;

#[derive(Error, Debug)]
pub enum SencityError {
    #[error("Service error: {0}")]
    Service(#[from] sencity_services::ServiceError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SencityError>;
