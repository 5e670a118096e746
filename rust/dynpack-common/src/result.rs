pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Returns early with [`ErrorKind::InvalidFormat`](crate::error::ErrorKind::InvalidFormat)
/// unless `$expr` holds. `$name` names the decoded element in the error.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        let holds = $expr;
        $crate::result::verify_data(holds, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_data(holds: bool, element: &str, condition: &str) -> Result<()> {
    if holds {
        Ok(())
    } else {
        malformed(element, condition)
    }
}

#[cold]
fn malformed(element: &str, condition: &str) -> Result<()> {
    Err(crate::error::Error::invalid_format(
        element,
        format!("expected {condition}"),
    ))
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check_len(bytes: &[u8]) -> super::Result<usize> {
        verify_data!(payload, bytes.len() >= 2);
        Ok(bytes.len())
    }

    #[test]
    fn test_verify_data() {
        assert_eq!(check_len(&[1, 2, 3]).unwrap(), 3);
        let err = check_len(&[1]).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidFormat { element, message } => {
                assert_eq!(element, "payload");
                assert!(message.starts_with("expected "));
                assert!(message.contains("len()"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}
