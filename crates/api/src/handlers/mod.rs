pub mod alerts;
pub mod history;
pub mod publishing;
pub mod tree;
