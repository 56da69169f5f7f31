pub mod crx;
