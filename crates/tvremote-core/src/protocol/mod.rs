//! Protocol module containing the event message types, the body codec, and
//! the sequence counter used to correlate replies.

pub mod codec;
pub mod connect_info;
pub mod messages;
pub mod sequence;

pub use codec::{encode_frame, read_frame, BincodeCodec, CodecError, WireCodec, FRAME_PREFIX_SIZE};
pub use connect_info::ConnectInfo;
pub use messages::*;
pub use sequence::SequenceCounter;
