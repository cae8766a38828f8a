mod value;

pub use value::{HostObject, HostValue, Value};
