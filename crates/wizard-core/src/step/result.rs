use crate::DataMap;

/// Resultado de procesar un step.
///
/// `Failure` es un rechazo de negocio esperado (no un error): el engine lo
/// resuelve redirigiendo con el mensaje adjunto.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    Success(DataMap),
    Failure(String),
}

impl StepResult {
    pub fn success(payload: DataMap) -> Self {
        StepResult::Success(payload)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        StepResult::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepResult::Success(_))
    }

    pub fn payload(&self) -> Option<&DataMap> {
        match self {
            StepResult::Success(p) => Some(p),
            StepResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            StepResult::Success(_) => None,
            StepResult::Failure(m) => Some(m),
        }
    }
}
