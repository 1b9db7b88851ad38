pub mod cribl_helper;
