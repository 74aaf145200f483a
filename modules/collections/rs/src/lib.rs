pub mod csr;
pub mod union_find;
