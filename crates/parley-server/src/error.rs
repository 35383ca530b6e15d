use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("key error: {0}")]
    Key(#[from] parley_crypto::KeyError),

    #[error("relay error: {0}")]
    Relay(#[from] parley_relay::RelayError),

    #[error("ingress error: {0}")]
    Ingress(#[from] parley_ingress::IngressError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
