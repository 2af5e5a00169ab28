use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A definition reuses a name that is already registered.
    DuplicateName(String),
    /// A lookup named something that was never registered.
    UndefinedReference(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateName(name) => write!(f, "duplicate definition: {}", name),
            RegistryError::UndefinedReference(name) => write!(f, "undefined reference: {}", name),
        }
    }
}

impl std::error::Error for RegistryError {}
