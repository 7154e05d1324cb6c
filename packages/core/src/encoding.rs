use nom::error::{
    ContextError as NomContextError, ErrorKind as NomErrorKind, FromExternalError,
    ParseError as NomParseError,
};
use std::fmt;
use thiserror::Error;

pub type Input<'a> = &'a [u8];
pub type ParseResult<'a, T> = nom::IResult<Input<'a>, T, NomError<Input<'a>>>;

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Nom(NomErrorKind),
    Context(&'static str),
    Validation(String),
}

/// The error type used by all parsers in this workspace. Collects the parser
/// contexts that were traversed and an optional validation message.
#[derive(PartialEq)]
pub struct NomError<I> {
    pub errors: Vec<(I, ErrorKind)>,
}

impl<I> NomError<I> {
    pub fn validation_failure(input: I, reason: String) -> Self {
        Self {
            errors: vec![(input, ErrorKind::Validation(reason))],
        }
    }
}

impl<I> NomParseError<I> for NomError<I> {
    fn from_error_kind(input: I, kind: NomErrorKind) -> Self {
        Self {
            errors: vec![(input, ErrorKind::Nom(kind))],
        }
    }

    fn append(input: I, kind: NomErrorKind, mut other: Self) -> Self {
        other.errors.push((input, ErrorKind::Nom(kind)));
        other
    }
}

impl<I> NomContextError<I> for NomError<I> {
    fn add_context(input: I, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ErrorKind::Context(ctx)));
        other
    }
}

impl<'a> fmt::Debug for NomError<&'a [u8]> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Innermost error first, contexts after
        for (i, (input, kind)) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match kind {
                ErrorKind::Context(ctx) => write!(f, "...in {}", ctx)?,
                ErrorKind::Nom(e) => write!(f, "nom error {:?} at 0x{}", e, hex::encode(input))?,
                ErrorKind::Validation(reason) => write!(f, "{}", reason)?,
            }
        }
        Ok(())
    }
}

/// Validates that the given condition is satisfied, otherwise results in a
/// nom Failure with the given error message.
pub fn validate(input: Input, condition: bool, message: impl Into<String>) -> ParseResult<()> {
    if condition {
        Ok((input, ()))
    } else {
        Err(nom::Err::Failure(NomError::validation_failure(
            input,
            message.into(),
        )))
    }
}

pub struct NomTryFromPrimitiveError(String);

impl<I> FromExternalError<I, NomTryFromPrimitiveError> for NomError<I> {
    fn from_external_error(
        input: I,
        _kind: NomErrorKind,
        e: NomTryFromPrimitiveError,
    ) -> Self {
        NomError::validation_failure(input, e.0)
    }
}

/// A helper trait that allows using the `TryFrom` implementation generated by
/// `derive_try_from_primitive` with a nom parser. The `try_from_primitive`
/// method returns a nom-compatible error if the conversion fails.
pub trait NomTryFromPrimitive
where
    Self: Sized + TryFrom<Self::Repr>,
    <Self as NomTryFromPrimitive>::Repr: Copy,
{
    type Repr;

    fn format_error(repr: Self::Repr) -> String;

    fn try_from_primitive(repr: Self::Repr) -> Result<Self, NomTryFromPrimitiveError> {
        Self::try_from(repr).map_err(|_| NomTryFromPrimitiveError(Self::format_error(repr)))
    }
}

pub trait Parsable
where
    Self: Sized,
{
    fn parse(i: Input) -> ParseResult<Self>;

    fn try_from_slice(data: &[u8]) -> EncodingResult<Self> {
        Self::parse(data).into_encoding_result()
    }
}

pub trait Serializable {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cookie_factory::SerializeFn<W> + 'a;

    fn try_to_vec(&self) -> EncodingResult<Vec<u8>> {
        cookie_factory::gen_simple(self.serialize(), Vec::new()).into_encoding_result()
    }
}

impl<T> Serializable for Option<T>
where
    T: Serializable,
{
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cookie_factory::SerializeFn<W> + 'a {
        move |out| match self {
            Some(v) => v.serialize()(out),
            None => encoders::empty()(out),
        }
    }
}

pub type EncodingResult<T> = Result<T, EncodingError>;

/// A simple error type concerning conversion from/to binary data
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Parse error: {0:?}")]
    Parse(Option<String>),
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Provides a way to convert foreign results into this crate's result type
/// without breaking the orphan rule
pub trait IntoEncodingResult {
    type Output;
    fn into_encoding_result(self) -> EncodingResult<Self::Output>;
}

impl<T> IntoEncodingResult for ParseResult<'_, T> {
    type Output = T;

    fn into_encoding_result(self) -> EncodingResult<T> {
        match self {
            Ok((_, output)) => Ok(output),
            Err(nom::Err::Incomplete(_)) | Err(nom::Err::Error(_)) => {
                Err(EncodingError::Parse(None))
            }
            Err(nom::Err::Failure(e)) => {
                // Preserve validation messages
                let reason = e.errors.iter().find_map(|(_, kind)| match kind {
                    ErrorKind::Validation(reason) => Some(reason.clone()),
                    _ => None,
                });
                Err(EncodingError::Parse(reason))
            }
        }
    }
}

impl<T> IntoEncodingResult for Result<T, cookie_factory::GenError> {
    type Output = T;

    fn into_encoding_result(self) -> EncodingResult<T> {
        self.map_err(|e| EncodingError::Serialize(format!("{:?}", e)))
    }
}

pub mod parsers {
    use super::{Input, ParseResult};
    use nom::bytes::complete::take as take_bytes;
    use nom::multi::length_data;
    use nom::number::complete::be_u8;

    /// Parses a bitmask with the given length into a `Vec<u8>`.
    /// The least significant bit of the first byte is mapped to `bit0_value`.
    pub fn fixed_length_bitmask_u8(
        i: Input,
        bit0_value: u8,
        bitmask_len: usize,
    ) -> ParseResult<Vec<u8>> {
        let (i, bitmask) = take_bytes(bitmask_len)(i)?;

        let ret = bitmask
            .iter()
            .enumerate()
            .flat_map(|(index, byte)| {
                (0..8u8)
                    .filter(move |bit| byte & (1 << bit) != 0)
                    .map(move |bit| (index as u8) * 8 + bit + bit0_value)
            })
            .collect();
        Ok((i, ret))
    }

    /// Parses a bitmask into a `Vec<u8>`, where the first byte is considered
    /// to be the bitmask length.
    pub fn variable_length_bitmask_u8(i: Input, bit0_value: u8) -> ParseResult<Vec<u8>> {
        let (i, bitmask) = length_data(be_u8)(i)?;

        let ret = bitmask
            .iter()
            .enumerate()
            .flat_map(|(index, byte)| {
                (0..8u8)
                    .filter(move |bit| byte & (1 << bit) != 0)
                    .map(move |bit| (index as u8) * 8 + bit + bit0_value)
            })
            .collect();
        Ok((i, ret))
    }

    #[test]
    fn test_fixed_length_bitmask() {
        // Bits 0 and 2 of the first byte, bit 0 of the second
        let input = [0b0000_0101, 0b0000_0001, 0xaa];
        let (rest, values) = fixed_length_bitmask_u8(&input, 1, 2).unwrap();
        assert_eq!(values, vec![1, 3, 9]);
        assert_eq!(rest, &[0xaa]);
    }
}

pub mod encoders {
    use cookie_factory as cf;

    /// A SerializeFn that does nothing
    pub fn empty<W: std::io::Write>() -> impl cf::SerializeFn<W> {
        move |out: cf::WriteContext<W>| Ok(out)
    }
}
