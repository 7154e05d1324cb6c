pub use crate::definitions::*;
pub use crate::encoding::{
    EncodingError, EncodingResult, IntoEncodingResult, NomTryFromPrimitive, Parsable, Serializable,
};
pub use crate::log::{LogPayload, LogPayloadDict, ToLogPayload};
