pub mod record_service;
pub use record_service::{EditOutcome, RecordEdit, RecordError, RecordService, RecordView};

pub mod record_service_impl;
pub use record_service_impl::SeaOrmRecordService;
