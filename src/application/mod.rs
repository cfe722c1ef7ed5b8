pub mod auto_mapper;
pub mod import_executor;
pub mod row_validator;
pub mod wizard;
