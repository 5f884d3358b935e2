mod field;
mod records;

pub use field::{FieldValue, Record};
pub use records::{
    LevyPayment, LevyStatus, MaintenanceRequest, MaintenanceStatus, Owner, Priority, RecordError,
    Unit,
};

pub(crate) use records::start_of_day;
