use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RassiResult<T> = Result<T, RassiError>;
pub type ParseResult<T> = RassiResult<T>;
pub type StoreResult<T> = RassiResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RassiErrorCategory {
    Success,
    ParseWarning,
    FormatError,
    IoSystemError,
    PersistenceError,
    InternalError,
}

impl RassiErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success | Self::ParseWarning => 0,
            Self::FormatError => 2,
            Self::IoSystemError => 3,
            Self::PersistenceError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::ParseWarning => "ParseWarning",
            Self::FormatError => "FormatError",
            Self::IoSystemError => "IoSystemError",
            Self::PersistenceError => "PersistenceError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success | Self::ParseWarning)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RassiError {
    category: RassiErrorCategory,
    code: &'static str,
    message: String,
}

impl RassiError {
    pub fn new(
        category: RassiErrorCategory,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn format(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(RassiErrorCategory::FormatError, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(RassiErrorCategory::IoSystemError, code, message)
    }

    pub fn persistence(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(RassiErrorCategory::PersistenceError, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(RassiErrorCategory::InternalError, code, message)
    }

    pub fn parse_warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(RassiErrorCategory::ParseWarning, code, message)
    }

    pub const fn category(&self) -> RassiErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else if self.category == RassiErrorCategory::ParseWarning {
            "WARNING"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for RassiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.name(),
            self.code,
            self.message
        )
    }
}

impl Error for RassiError {}
