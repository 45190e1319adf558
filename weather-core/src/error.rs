use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single weather lookup or history operation.
///
/// Display strings are the user-facing detail returned to HTTP clients.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Chave da API não configurada")]
    Configuration,

    #[error("Cidade não encontrada")]
    NotFound,

    #[error("Erro da API: {0}")]
    Provider(String),

    #[error("Erro na requisição: {0}")]
    Transport(#[source] BoxError),

    #[error("Erro interno: {0}")]
    Internal(String),
}

/// Coarse classification of [`WeatherError`], used to pick a response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    NotFound,
    Provider,
    Transport,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Provider => "provider",
            ErrorKind::Transport => "transport",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration => ErrorKind::Configuration,
            Self::NotFound => ErrorKind::NotFound,
            Self::Provider(_) => ErrorKind::Provider,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    pub(crate) fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}
