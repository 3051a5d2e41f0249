pub mod sql_injection_protection;
