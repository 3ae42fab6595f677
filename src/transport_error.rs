use std::fmt;

use crate::manager::CidError;

/// Transport-level errors occur when a peer violates the protocol specification
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Error {
    /// Type of error
    pub code: Code,
    /// Human-readable explanation of the reason
    pub reason: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.code.fmt(f)?;
        if !self.reason.is_empty() {
            f.write_str(": ")?;
            f.write_str(&self.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl From<Code> for Error {
    fn from(x: Code) -> Self {
        Self {
            code: x,
            reason: String::new(),
        }
    }
}

impl From<CidError> for Error {
    fn from(x: CidError) -> Self {
        Self::PROTOCOL_VIOLATION(x.to_string())
    }
}

/// Transport-level error code
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Code(u64);

impl From<Code> for u64 {
    fn from(x: Code) -> Self {
        x.0
    }
}

macro_rules! errors {
    {$($name:ident($val:expr) $desc:expr;)*} => {
        #[allow(non_snake_case)]
        impl Error {
            $(
            pub(crate) fn $name<T>(reason: T) -> Self where T: Into<String> {
                Self {
                    code: Code::$name,
                    reason: reason.into(),
                }
            }
            )*
        }

        impl Code {
            $(#[doc = $desc] pub const $name: Self = Code($val);)*
        }

        impl fmt::Debug for Code {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    $($val => f.write_str(stringify!($name)),)*
                    _ => write!(f, "Code({:x})", self.0),
                }
            }
        }

        impl fmt::Display for Code {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    $($val => f.write_str($desc),)*
                    _ => f.write_str("unknown error"),
                }
            }
        }
    }
}

errors! {
    PROTOCOL_VIOLATION(0xA) "an endpoint detected an error with protocol compliance that was not covered by more specific error codes";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_are_protocol_violations() {
        let err = Error::from(CidError::ConflictingConnectionId { sequence: 42 });
        assert_eq!(err.code, Code::PROTOCOL_VIOLATION);
        assert_eq!(
            err.reason,
            "received conflicting connection IDs for sequence number 42"
        );

        let err = Error::from(CidError::ConflictingResetToken { sequence: 7 });
        assert_eq!(err.code, Code::PROTOCOL_VIOLATION);
        assert!(err.to_string().ends_with(
            ": received conflicting stateless reset tokens for sequence number 7"
        ));
    }

    #[test]
    fn code_formatting() {
        assert_eq!(format!("{:?}", Code::PROTOCOL_VIOLATION), "PROTOCOL_VIOLATION");
        assert_eq!(format!("{:?}", Code(0x1234)), "Code(1234)");
        assert_eq!(u64::from(Code::PROTOCOL_VIOLATION), 0xA);
        assert_eq!(
            Error::from(Code::PROTOCOL_VIOLATION).to_string(),
            Code::PROTOCOL_VIOLATION.to_string()
        );
    }
}
