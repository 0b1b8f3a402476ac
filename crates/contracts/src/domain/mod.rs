pub mod a001_faq;
pub mod a002_vehicle_make;
pub mod a003_user_account;
