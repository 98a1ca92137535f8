pub mod duplicate_guard;
pub mod lottery_service;
pub mod pool;
pub mod storage;
