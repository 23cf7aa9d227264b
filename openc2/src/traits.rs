use crate::Error;

/// Check an OpenC2 structure for validity that can't be enforced by the type system.
pub trait Check {
    /// Returns all the validation errors in the structure, or `Ok` if there are none.
    ///
    /// Use `Error::accumulator()` to accumulate multiple errors rather than returning
    /// immediately.
    fn check(&self) -> Result<(), Error>;
}

impl<T: Check> Check for Option<T> {
    fn check(&self) -> Result<(), Error> {
        match self {
            Some(inner) => inner.check(),
            None => Ok(()),
        }
    }
}

pub trait IsEmpty {
    fn is_empty(&self) -> bool;
}

impl<T: IsEmpty> IsEmpty for Option<T> {
    fn is_empty(&self) -> bool {
        self.as_ref().is_none_or(IsEmpty::is_empty)
    }
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}
