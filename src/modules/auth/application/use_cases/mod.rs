pub mod login_account;
pub mod register_account;
