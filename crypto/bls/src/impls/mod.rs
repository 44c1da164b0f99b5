pub mod blst;
