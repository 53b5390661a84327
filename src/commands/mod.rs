pub mod rekey_legacy;
pub mod serve;
