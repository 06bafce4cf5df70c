pub mod mock_stream;
pub mod rc_writer;

pub use mock_stream::{CloseProbe, MockStream, WANT_ERROR};
pub use rc_writer::RcWriter;
