use crate::commandclass::{CCId, CCRequest};
use cookie_factory as cf;
use zw_core::encoding::{Serializable, encoders::empty};
use zw_core::prelude::*;

/// The NoOperation CC carries no data. It is used to ping nodes: the
/// transmit callback alone tells whether the node acknowledged the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOperationCC {}

impl CCId for NoOperationCC {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::NoOperation
    }

    fn cc_command(&self) -> Option<u8> {
        None
    }
}

impl CCRequest for NoOperationCC {}

impl Serializable for NoOperationCC {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        empty()
    }
}

#[test]
fn test_as_raw() {
    use crate::commandclass::AsCCRaw;

    let raw = NoOperationCC {}.as_raw().unwrap();
    assert_eq!(raw.try_to_vec().unwrap(), vec![0x00]);
}
