pub mod record_logging;
pub mod rig;
pub mod stream_output;
