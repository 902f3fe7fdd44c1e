pub mod log_record;
pub mod option_spec;
pub mod option_value;
pub mod usage_doc;

pub use log_record::{LogRecord, Message, TIMESTAMP_FORMAT};
pub use option_spec::{OptionSet, OptionSpec, ReservedFlag, ReservedFlags};
pub use option_value::{OptionValue, OptionValues};
pub use usage_doc::UsageDoc;
