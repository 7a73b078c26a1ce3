pub mod account_store_memory;
pub mod account_store_postgres;
pub mod sea_orm_entity;
pub mod security;

pub use account_store_memory::AccountStoreMemory;
pub use account_store_postgres::AccountStorePostgres;
