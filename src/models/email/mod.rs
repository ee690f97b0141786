pub mod email_summary;
