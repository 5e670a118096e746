use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn unsupported_version(component: impl Into<String>, version: i64) -> Error {
        Error(
            ErrorKind::UnsupportedVersion {
                component: component.into(),
                version,
            }
            .into(),
        )
    }

    pub fn unsupported_type(type_name: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnsupportedType {
                type_name: type_name.into(),
            }
            .into(),
        )
    }

    pub fn unknown_type_name(name: impl Into<String>) -> Error {
        Error(ErrorKind::UnknownTypeName { name: name.into() }.into())
    }

    pub fn encode(context: impl Into<String>, source: bincode::error::EncodeError) -> Error {
        Error(
            ErrorKind::Encode {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    pub fn decode(context: impl Into<String>, source: bincode::error::DecodeError) -> Error {
        Error(
            ErrorKind::Decode {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    /// Returns `true` when the error reports a type name missing from a registry.
    pub fn is_unknown_type_name(&self) -> bool {
        matches!(self.kind(), ErrorKind::UnknownTypeName { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("unsupported {component} version ({version})")]
    UnsupportedVersion { component: String, version: i64 },

    #[error("value must not be nil in call to register_type")]
    NilType,

    #[error("requested type '{name}' has not been registered")]
    UnknownTypeName { name: String },

    #[error("unsupported value type '{type_name}'")]
    UnsupportedType { type_name: String },

    #[error("no data provided to deserialise")]
    NoData,

    #[error("no data found to deserialise")]
    NoDeserialisableData,

    #[error("unknown envelope category tag {tag}")]
    UnknownCategory { tag: u8 },

    #[error("invalid format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("failed to encode {context}: {source}")]
    Encode {
        context: String,
        source: bincode::error::EncodeError,
    },

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        source: bincode::error::DecodeError,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn test_error_kind_roundtrip() {
        let err = Error::unknown_type_name("shapes.Circle");
        assert!(err.is_unknown_type_name());
        assert_eq!(
            err.to_string(),
            "requested type 'shapes.Circle' has not been registered"
        );
        match err.into_kind() {
            ErrorKind::UnknownTypeName { name } => assert_eq!(name, "shapes.Circle"),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::from(ErrorKind::NoData).to_string(),
            "no data provided to deserialise"
        );
        assert_eq!(
            Error::from(ErrorKind::NoDeserialisableData).to_string(),
            "no data found to deserialise"
        );
        assert_eq!(
            Error::unsupported_version("BincodeVersion", 7).to_string(),
            "unsupported BincodeVersion version (7)"
        );
    }
}
