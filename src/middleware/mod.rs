pub mod security_log;
