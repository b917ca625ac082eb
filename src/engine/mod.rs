pub(crate) mod gate;
pub(crate) mod scheduler;
pub(crate) mod timer;
