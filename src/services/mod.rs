pub mod file_service;
pub mod storage;
