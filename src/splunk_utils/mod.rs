pub mod hec_export;
