pub mod lifecycle;
pub mod suggest;
pub mod task_ops;
pub mod unit_ops;
