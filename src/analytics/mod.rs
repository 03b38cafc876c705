pub mod poll_log;
