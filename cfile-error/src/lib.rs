#![deny(missing_docs)]

//! This crate defines error & result types for the CFile block encodings.
//! It also contains a variety of useful macros for error handling.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{env, fmt};

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

#[allow(clippy::fallible_impl_from)]
impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    #[allow(clippy::panic)]
    fn from(msg: T) -> Self {
        if env::var("CFILE_PANIC_ON_ERR").as_deref().unwrap_or("") == "1" {
            panic!("{}\nBacktrace:\n{}", msg.into(), Backtrace::capture());
        } else {
            Self(msg.into())
        }
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

// Spelled via an alias so `thiserror` treats the field as plain data rather than
// generating the nightly-only `Error::provide` for it.
type CapturedBacktrace = Backtrace;

/// The top-level error type for the block encodings.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum CFileError {
    /// A block is truncated or its metadata points outside of the block.
    #[error("corrupt block: {0}\nBacktrace:\n{1}")]
    CorruptBlock(ErrString, CapturedBacktrace),
    /// An argument is outside of the range the operation accepts.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, CapturedBacktrace),
    /// An operation was called outside of the lifecycle stage it requires.
    #[error("invalid state: {0}\nBacktrace:\n{1}")]
    InvalidState(ErrString, CapturedBacktrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, #[source] Box<CFileError>),
}

/// The kind of a [`CFileError`], with any context wrappers peeled away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CFileError::CorruptBlock`].
    CorruptBlock,
    /// See [`CFileError::InvalidArgument`].
    InvalidArgument,
    /// See [`CFileError::InvalidState`].
    InvalidState,
}

impl CFileError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        CFileError::Context(msg.into(), Box::new(self))
    }

    /// The kind of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CFileError::CorruptBlock(..) => ErrorKind::CorruptBlock,
            CFileError::InvalidArgument(..) => ErrorKind::InvalidArgument,
            CFileError::InvalidState(..) => ErrorKind::InvalidState,
            CFileError::Context(_, inner) => inner.kind(),
        }
    }
}

impl Debug for CFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return [`CFileError`]s as their error type.
pub type CFileResult<T> = Result<T, CFileError>;

/// A convenient macro for creating a [`CFileError`].
///
/// The kind defaults to [`CFileError::InvalidArgument`] when omitted.
#[macro_export]
macro_rules! cfile_err {
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use(
            $crate::CFileError::Context($msg.into(), Box::new($err))
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::CFileError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::cfile_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning a [`CFileError`] from the enclosing function.
#[macro_export]
macro_rules! cfile_bail {
    ($($tt:tt)+) => {
        return Err($crate::cfile_err!($($tt)+))
    };
}

/// A convenient macro for panicking with a [`CFileError`] in the presence of a programmer error
/// (e.g., an invariant has been violated).
#[macro_export]
macro_rules! cfile_panic {
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::cfile_panic!($crate::cfile_err!($variant: $fmt, $($arg),*))
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err: $crate::CFileError = $err;
        panic!("{}", err.with_context(format!($fmt, $($arg),*)))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::cfile_panic!($crate::cfile_err!($fmt, $($arg),*))
    };
    ($err:expr) => {{
        let err: $crate::CFileError = $err;
        panic!("{}", err)
    }};
}

/// A trait for unwrapping a result or option, panicking with a [`CFileError`] and the given
/// message if the value is absent.
pub trait CFileExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value or panics with the given message.
    ///
    /// Only use this for invariants the surrounding code has already established.
    fn cfile_expect(self, msg: &str) -> Self::Output;
}

impl<T, E> CFileExpect for Result<T, E>
where
    E: Into<CFileError>,
{
    type Output = T;

    #[allow(clippy::panic)]
    #[inline(always)]
    fn cfile_expect(self, msg: &str) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|e| cfile_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> CFileExpect for Option<T> {
    type Output = T;

    #[allow(clippy::panic)]
    #[inline(always)]
    fn cfile_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = CFileError::InvalidState(msg.to_string().into(), Backtrace::capture());
            cfile_panic!(err)
        })
    }
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::CFileError) -> crate::CFileError {
        error
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;

    fn bail_with(kind: ErrorKind) -> CFileResult<()> {
        match kind {
            ErrorKind::CorruptBlock => cfile_bail!(CorruptBlock: "truncated at byte {}", 3),
            ErrorKind::InvalidArgument => cfile_bail!("index {} out of range", 7),
            ErrorKind::InvalidState => cfile_bail!(InvalidState: "finished twice"),
        }
    }

    #[rstest]
    #[case(ErrorKind::CorruptBlock, "corrupt block: truncated at byte 3")]
    #[case(ErrorKind::InvalidArgument, "index 7 out of range")]
    #[case(ErrorKind::InvalidState, "invalid state: finished twice")]
    fn macros_build_the_requested_kind(#[case] kind: ErrorKind, #[case] message: &str) {
        let err = bail_with(kind).unwrap_err();
        assert_eq!(err.kind(), kind);
        assert!(err.to_string().starts_with(message), "{err}");
    }

    #[test]
    fn context_preserves_kind() {
        let err = cfile_err!(CorruptBlock: "bad selector").with_context("reading block 4");
        assert_eq!(err.kind(), ErrorKind::CorruptBlock);
        assert!(err.to_string().starts_with("reading block 4: corrupt block: bad selector"));
    }

    #[test]
    fn expect_passes_values_through() {
        assert_eq!(Some(5).cfile_expect("present"), 5);
        assert_eq!(CFileResult::Ok(6).cfile_expect("present"), 6);
    }

    #[test]
    #[should_panic(expected = "offset missing")]
    fn expect_panics_on_none() {
        let value: Option<u32> = None;
        value.cfile_expect("offset missing");
    }
}
