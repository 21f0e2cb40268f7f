//! Configuration access port.

/// Read access to `[section] key = value` settings.
///
/// Values come back raw so validation can reject what does not parse.
/// `get_bool` is the exception: an unrecognised spelling yields `default`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
