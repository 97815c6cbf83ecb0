use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OracleResult<T> = Result<T, OracleError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleErrorCategory {
    InputValidationError,
    IoSystemError,
    ToolchainError,
    InternalError,
}

impl OracleErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ToolchainError => "ToolchainError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ToolchainError => 4,
            Self::InternalError => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleError {
    category: OracleErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl OracleError {
    pub fn new(
        category: OracleErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            OracleErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OracleErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn toolchain(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OracleErrorCategory::ToolchainError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OracleErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> OracleErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }
}

impl Display for OracleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for OracleError {}
